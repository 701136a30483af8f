use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::coordinate_system::WORLD_UP;

use crate::engine::cuboid::CuboidNode;
use crate::tools::selection::SelectCuboid;

/// Marks the perspective context camera.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct OrbitView;

/// Orbit state of the context camera. Z-up: yaw turns around world Z,
/// pitch lifts the eye above the XY plane.
#[derive(Resource, Debug, Clone)]
pub struct OrbitViewCamera {
    pub focus_point: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub is_dragging: bool,
}

impl Default for OrbitViewCamera {
    fn default() -> Self {
        Self {
            focus_point: Vec3::ZERO,
            distance: 25.0,
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.6,
            is_dragging: false,
        }
    }
}

impl OrbitViewCamera {
    pub fn eye_position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.focus_point
            + Vec3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, sin_pitch) * self.distance
    }

    pub fn target_transform(&self) -> Transform {
        Transform::from_translation(self.eye_position()).looking_at(self.focus_point, WORLD_UP)
    }

    /// Pans the focus point in the camera's screen plane.
    fn pan(&mut self, delta: Vec2, rotation: Quat) {
        let speed = self.distance * 0.0015;
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        self.focus_point += (-right * delta.x + up * delta.y) * speed;
    }
}

/// Right-drag orbits, middle-drag pans, wheel zooms. Only reacts to input
/// that starts inside the orbit view's viewport.
pub fn orbit_camera_controller(
    mut cameras: Query<(&mut Transform, &Camera), (With<OrbitView>, Without<CuboidNode>)>,
    mut orbit: ResMut<OrbitViewCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    time: Res<Time>,
) {
    let Ok((mut camera_transform, camera)) = cameras.single_mut() else {
        return;
    };

    let hovered = windows
        .single()
        .ok()
        .and_then(|window| window.cursor_position())
        .zip(camera.logical_viewport_rect())
        .is_some_and(|(cursor, rect)| rect.contains(cursor));

    let orbit_buttons = [MouseButton::Right, MouseButton::Middle];
    if hovered && mouse_button.any_just_pressed(orbit_buttons) {
        orbit.is_dragging = true;
    }
    if !mouse_button.any_pressed(orbit_buttons) {
        orbit.is_dragging = false;
    }

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if orbit.is_dragging && mouse_delta != Vec2::ZERO {
        if mouse_button.pressed(MouseButton::Right) {
            orbit.yaw -= mouse_delta.x * 0.0035;
            orbit.pitch = (orbit.pitch + mouse_delta.y * 0.0030).clamp(-1.5, 1.5);
        } else if mouse_button.pressed(MouseButton::Middle) {
            let rotation = camera_transform.rotation;
            orbit.pan(mouse_delta, rotation);
        }
    }

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }
    if hovered && scroll_accum.abs() > f32::EPSILON {
        orbit.distance = (orbit.distance * 0.9_f32.powf(scroll_accum)).clamp(0.5, 500.0);
    }

    let target = orbit.target_transform();
    let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target.translation, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target.rotation, lerp_speed);
}

/// Moves the orbit focus onto each newly selected cuboid.
pub fn focus_orbit_on_selection(
    mut selections: EventReader<SelectCuboid>,
    roots: Query<&Transform, With<CuboidNode>>,
    mut orbit: ResMut<OrbitViewCamera>,
) {
    for event in selections.read() {
        let Some(handle) = &event.cuboid else {
            continue;
        };
        if let Ok(root) = roots.get(handle.entity) {
            orbit.focus_point = root.translation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_orbits_around_focus_at_distance() {
        let orbit = OrbitViewCamera {
            focus_point: Vec3::new(1.0, 2.0, 3.0),
            distance: 7.0,
            ..default()
        };
        let transform = orbit.target_transform();
        assert!((transform.translation.distance(orbit.focus_point) - 7.0).abs() < 1e-4);
        let to_focus = (orbit.focus_point - transform.translation).normalize();
        assert!(transform.forward().abs_diff_eq(to_focus, 1e-5));
    }
}
