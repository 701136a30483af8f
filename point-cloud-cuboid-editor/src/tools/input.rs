use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::camera::ViewControlSettings;
use crate::engine::camera::orbit_camera::OrbitView;
use crate::engine::camera::view_camera::ViewCameraController;
use crate::tools::transform::{
    PointerButton, PointerEventKind, TransformInteraction, ViewPointerEvent,
};

/// Which viewport the pointer belongs to. While any button is held the
/// pointer stays captured by the viewport the press started in.
#[derive(Resource, Debug, Default)]
pub struct PointerCapture {
    pub hovered: Option<Entity>,
    pub captured: Option<Entity>,
    pub last_position: Option<Vec2>,
    /// Pointer motion since the previous frame, in logical pixels.
    pub delta: Vec2,
}

impl PointerCapture {
    pub fn active_view(&self) -> Option<Entity> {
        self.captured.or(self.hovered)
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Turns window cursor and button input into [`ViewPointerEvent`]s for the
/// view under the pointer.
pub fn route_window_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    buttons: Res<ButtonInput<MouseButton>>,
    cameras: Query<(Entity, &Camera), Or<(With<ViewCameraController>, With<OrbitView>)>>,
    edit_views: Query<(), With<ViewCameraController>>,
    mut capture: ResMut<PointerCapture>,
    mut pointer_events: EventWriter<ViewPointerEvent>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let cursor = window.cursor_position();

    capture.hovered = cursor.and_then(|cursor| {
        cameras.iter().find_map(|(entity, camera)| {
            camera
                .logical_viewport_rect()
                .filter(|rect| rect.contains(cursor))
                .map(|_| entity)
        })
    });
    capture.delta = match (cursor, capture.last_position) {
        (Some(now), Some(before)) => now - before,
        _ => Vec2::ZERO,
    };
    capture.last_position = cursor;

    if capture.captured.is_none() && buttons.get_just_pressed().next().is_some() {
        capture.captured = capture.hovered;
    }

    let Some(view) = capture.active_view() else {
        return;
    };
    let origin = cameras
        .get(view)
        .ok()
        .and_then(|(_, camera)| camera.logical_viewport_rect())
        .map_or(Vec2::ZERO, |rect| rect.min);

    if edit_views.contains(view) {
        let position = cursor.map(|c| c - origin);
        if let Some(position) = position {
            if capture.delta != Vec2::ZERO {
                pointer_events.write(ViewPointerEvent {
                    view,
                    kind: PointerEventKind::Move,
                    position,
                });
            }
            for button in buttons.get_just_pressed().filter_map(|b| pointer_button(*b)) {
                pointer_events.write(ViewPointerEvent {
                    view,
                    kind: PointerEventKind::Down(button),
                    position,
                });
            }
        }
        // releases are delivered even when the pointer left the window
        let release_position = position.unwrap_or(Vec2::ZERO);
        for button in buttons.get_just_released().filter_map(|b| pointer_button(*b)) {
            pointer_events.write(ViewPointerEvent {
                view,
                kind: PointerEventKind::Up(button),
                position: release_position,
            });
        }
    }

    if buttons.get_pressed().next().is_none() {
        capture.captured = None;
    }
}

/// Middle-drag pans and the wheel zooms the view under the pointer. A view
/// in the middle of a handle drag keeps its camera still.
pub fn navigate_views(
    mut wheel: EventReader<MouseWheel>,
    buttons: Res<ButtonInput<MouseButton>>,
    capture: Res<PointerCapture>,
    settings: Res<ViewControlSettings>,
    mut views: Query<(&mut ViewCameraController, Option<&TransformInteraction>)>,
) {
    let scroll: f32 = wheel
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / settings.pixels_per_line,
        })
        .sum();

    let Some((mut controller, interaction)) = capture
        .active_view()
        .and_then(|view| views.get_mut(view).ok())
    else {
        return;
    };
    if interaction.is_some_and(TransformInteraction::is_dragging) {
        return;
    }

    if buttons.pressed(MouseButton::Middle) && capture.delta != Vec2::ZERO {
        let delta = capture.delta * settings.pan_speed;
        controller.pan(delta.x, delta.y);
    }
    if scroll.abs() > f32::EPSILON {
        let factor = settings.zoom_step.powf(scroll.abs());
        // wheel up zooms in
        controller.dolly(factor, scroll > 0.0);
    }
}

/// Keeps controller zoom bounds in step with [`ViewControlSettings`].
pub fn apply_view_control_settings(
    settings: Res<ViewControlSettings>,
    mut views: Query<&mut ViewCameraController>,
) {
    if !settings.is_changed() {
        return;
    }
    for mut controller in &mut views {
        controller.set_zoom_bounds(settings.min_zoom, settings.max_zoom);
    }
}
