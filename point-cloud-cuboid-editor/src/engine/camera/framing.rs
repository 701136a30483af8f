use bevy::prelude::*;
use bevy::render::camera::ScalingMode;
use constants::framing::{
    DEFAULT_ZOOM, FAR_MARGIN, FIT_PADDING, FREE_FAR_PLANE, MAX_ZOOM, MIN_ZOOM, NEAR_MARGIN,
    RAY_PULL_BACK, VIEW_STANDOFF,
};

use crate::engine::view::ViewAxis;

/// Projection work the sync system still has to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionUpdate {
    #[default]
    None,
    FarOnly,
    Full,
}

impl ProjectionUpdate {
    fn merge(self, other: ProjectionUpdate) -> ProjectionUpdate {
        match (self, other) {
            (ProjectionUpdate::Full, _) | (_, ProjectionUpdate::Full) => ProjectionUpdate::Full,
            (ProjectionUpdate::FarOnly, _) | (_, ProjectionUpdate::FarOnly) => {
                ProjectionUpdate::FarOnly
            }
            _ => ProjectionUpdate::None,
        }
    }
}

/// Orthographic camera state owned by a view controller.
///
/// `transform` is relative to the frame of the attached cuboid (or to the
/// world when detached). `zoom` is logical pixels per world unit.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthoCamera {
    pub transform: Transform,
    pub near: f32,
    pub far: f32,
    pub zoom: f32,
    pending: ProjectionUpdate,
}

impl OrthoCamera {
    pub fn new(view: ViewAxis) -> Self {
        let mut camera = Self {
            transform: Transform::IDENTITY,
            near: 0.0,
            far: FREE_FAR_PLANE,
            zoom: DEFAULT_ZOOM,
            pending: ProjectionUpdate::None,
        };
        reset(view, &mut camera);
        camera
    }

    pub fn request_projection_update(&mut self, update: ProjectionUpdate) {
        self.pending = self.pending.merge(update);
    }

    pub fn pending_projection_update(&self) -> ProjectionUpdate {
        self.pending
    }

    pub fn take_projection_update(&mut self) -> ProjectionUpdate {
        std::mem::take(&mut self.pending)
    }

    pub fn orthographic_projection(&self) -> OrthographicProjection {
        OrthographicProjection {
            near: self.near,
            far: self.far,
            scale: 1.0 / self.zoom,
            scaling_mode: ScalingMode::WindowSize,
            ..OrthographicProjection::default_3d()
        }
    }

    /// Picking ray through `cursor` (logical pixels, origin top-left) for a
    /// camera placed at `frame`.
    pub fn ray(&self, frame: &Transform, cursor: Vec2, viewport: Vec2) -> Option<Ray3d> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 || self.zoom <= 0.0 {
            return None;
        }
        let offset = Vec3::new(
            (cursor.x - viewport.x * 0.5) / self.zoom,
            (viewport.y * 0.5 - cursor.y) / self.zoom,
            RAY_PULL_BACK,
        );
        if !offset.is_finite() {
            return None;
        }

        Some(Ray3d::new(frame.transform_point(offset), frame.forward()))
    }

    /// Inverse of [`OrthoCamera::ray`]: where `point` lands in the viewport.
    pub fn project(&self, frame: &Transform, point: Vec3, viewport: Vec2) -> Vec2 {
        let local = frame.rotation.inverse() * (point - frame.translation);
        Vec2::new(
            viewport.x * 0.5 + local.x * self.zoom,
            viewport.y * 0.5 - local.y * self.zoom,
        )
    }
}

/// Puts a detached camera back at its standoff position.
pub fn reset(view: ViewAxis, camera: &mut OrthoCamera) {
    camera.transform.rotation = view.camera_rotation();
    camera.transform.translation = view.eye() * VIEW_STANDOFF;
    camera.near = 0.0;
    camera.far = FREE_FAR_PLANE;
    camera.request_projection_update(ProjectionUpdate::Full);
}

/// Frames a cuboid with extent `scale` and rebuilds the whole projection.
pub fn adjust(view: ViewAxis, camera: &mut OrthoCamera, scale: Vec3) {
    place_on_face(view, camera, scale);
    camera.request_projection_update(ProjectionUpdate::Full);
}

/// Like [`adjust`] but only the depth range of the projection changes.
pub fn adjust_far(view: ViewAxis, camera: &mut OrthoCamera, scale: Vec3) {
    if place_on_face(view, camera, scale) {
        camera.request_projection_update(ProjectionUpdate::FarOnly);
    }
}

/// Largest zoom at which the padded in-plane extent fits the viewport.
pub fn fit_zoom(view: ViewAxis, viewport: Vec2, scale: Vec3) -> f32 {
    let extent = view.in_plane_extent(scale) * FIT_PADDING;
    let zoom = (viewport.x / extent.x).min(viewport.y / extent.y);
    if zoom.is_finite() && zoom > 0.0 {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        DEFAULT_ZOOM
    }
}

// Camera sits on the camera-facing face, pan kept. Returns whether the
// depth range changed.
fn place_on_face(view: ViewAxis, camera: &mut OrthoCamera, scale: Vec3) -> bool {
    let depth = view.depth_extent(scale);
    let pan = view.in_plane(camera.transform.translation);
    camera.transform.rotation = view.camera_rotation();
    camera.transform.translation = view.from_in_plane(pan) + view.eye() * (depth * 0.5);

    let (near, far) = (-NEAR_MARGIN, depth + FAR_MARGIN);
    let changed = camera.near != near || camera.far != far;
    camera.near = near;
    camera.far = far;
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reset_front_sits_at_standoff() {
        let mut camera = OrthoCamera::new(ViewAxis::Front);
        camera.transform.translation = Vec3::new(3.0, 4.0, 5.0);
        reset(ViewAxis::Front, &mut camera);

        assert!(camera.transform.translation.abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-6));
        assert_relative_eq!(camera.near, 0.0);
        assert_relative_eq!(camera.far, 20.0);
        assert_eq!(camera.pending_projection_update(), ProjectionUpdate::Full);
    }

    #[test]
    fn reset_points_every_view_at_origin() {
        for view in ViewAxis::ALL {
            let camera = OrthoCamera::new(view);
            let forward = camera.transform.forward();
            let to_origin = (-camera.transform.translation).normalize();
            assert!(forward.abs_diff_eq(to_origin, 1e-6));
        }
    }

    #[test]
    fn adjust_keeps_pan_and_moves_to_face() {
        let mut camera = OrthoCamera::new(ViewAxis::Top);
        camera.transform.translation = Vec3::new(0.5, -0.25, 10.0);
        adjust(ViewAxis::Top, &mut camera, Vec3::new(2.0, 1.0, 3.0));

        assert!(camera.transform.translation.abs_diff_eq(Vec3::new(0.5, -0.25, 1.5), 1e-6));
        assert_relative_eq!(camera.far, 3.0 + FAR_MARGIN);
        assert_relative_eq!(camera.near, -NEAR_MARGIN);
    }

    #[test]
    fn adjust_far_only_requests_depth_update_on_change() {
        let mut camera = OrthoCamera::new(ViewAxis::Side);
        camera.take_projection_update();
        let scale = Vec3::new(1.0, 2.0, 1.0);

        adjust_far(ViewAxis::Side, &mut camera, scale);
        assert_eq!(camera.take_projection_update(), ProjectionUpdate::FarOnly);
        adjust_far(ViewAxis::Side, &mut camera, scale);
        assert_eq!(camera.take_projection_update(), ProjectionUpdate::None);
        // side looks from -Y
        assert_relative_eq!(camera.transform.translation.y, -1.0);
    }

    #[test]
    fn fit_zoom_uses_the_tighter_axis() {
        let zoom = fit_zoom(ViewAxis::Top, Vec2::new(800.0, 600.0), Vec3::new(2.0, 1.0, 1.0));
        assert_relative_eq!(zoom, 800.0 / (2.0 * FIT_PADDING));

        let tiny = fit_zoom(ViewAxis::Top, Vec2::new(800.0, 600.0), Vec3::splat(1e-6));
        assert_relative_eq!(tiny, MAX_ZOOM);
    }

    #[test]
    fn ray_and_project_agree() {
        let mut camera = OrthoCamera::new(ViewAxis::Front);
        camera.zoom = 50.0;
        let frame = camera.transform;
        let viewport = Vec2::new(640.0, 480.0);
        let cursor = Vec2::new(100.0, 420.0);

        let ray = camera.ray(&frame, cursor, viewport).unwrap();
        let point = ray.get_point(RAY_PULL_BACK + 3.0);
        assert!(camera.project(&frame, point, viewport).abs_diff_eq(cursor, 1e-3));
        assert!(camera.ray(&frame, cursor, Vec2::ZERO).is_none());
    }
}
