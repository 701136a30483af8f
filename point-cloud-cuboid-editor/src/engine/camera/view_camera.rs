use bevy::prelude::*;
use constants::framing::{CHANGE_EPSILON, DEFAULT_VIEWPORT_SIZE, MAX_ZOOM, MIN_ZOOM};

use super::framing::{OrthoCamera, ProjectionUpdate, adjust, adjust_far, fit_zoom, reset};
use crate::engine::cuboid::{CuboidHandle, CuboidId, CuboidPose, CuboidNode};
use crate::engine::error::{CuboidError, ViewError};
use crate::engine::view::ViewAxis;

/// Emitted whenever a view camera moved, zoomed or changed its depth range.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewChanged {
    pub view: Entity,
}

/// Outcome of [`ViewCameraController::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachKind {
    /// A different cuboid: pan reset, zoom fitted, camera reframed.
    Reframed,
    /// The cuboid already attached: only the depth range followed its extent.
    Adjusted,
}

/// Orthographic view camera that frames one cuboid along a fixed axis.
///
/// While attached, the camera lives in the cuboid's frame: panning, zooming
/// and framing are expressed relative to the box, and the camera follows the
/// box when it moves or rotates.
#[derive(Component, Debug, Clone)]
pub struct ViewCameraController {
    view: ViewAxis,
    camera: OrthoCamera,
    target: Option<CuboidHandle>,
    editing_id: Option<CuboidId>,
    pan: Vec2,
    min_zoom: f32,
    max_zoom: f32,
    enabled: bool,
    viewport_size: Vec2,
    last_snapshot: Option<(Vec3, f32, f32)>,
}

impl ViewCameraController {
    pub fn new(view: ViewAxis) -> Self {
        Self {
            view,
            camera: OrthoCamera::new(view),
            target: None,
            editing_id: None,
            pan: Vec2::ZERO,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            enabled: true,
            viewport_size: Vec2::from(DEFAULT_VIEWPORT_SIZE),
            last_snapshot: None,
        }
    }

    pub fn with_viewport_size(mut self, size: Vec2) -> Self {
        self.set_viewport_size(size);
        self
    }

    pub fn with_zoom_bounds(mut self, min: f32, max: f32) -> Self {
        self.set_zoom_bounds(min, max);
        self
    }

    pub fn set_zoom_bounds(&mut self, min: f32, max: f32) {
        if !min.is_finite() || !max.is_finite() || min.min(max) <= 0.0 {
            return;
        }
        self.min_zoom = min.min(max);
        self.max_zoom = max.max(min);
        let zoom = self.camera.zoom.clamp(self.min_zoom, self.max_zoom);
        if zoom != self.camera.zoom {
            self.camera.zoom = zoom;
            self.camera.request_projection_update(ProjectionUpdate::Full);
        }
    }

    pub fn view(&self) -> ViewAxis {
        self.view
    }

    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    pub fn target(&self) -> Option<&CuboidHandle> {
        self.target.as_ref()
    }

    pub fn editing_id(&self) -> Option<&CuboidId> {
        self.editing_id.as_ref()
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.pan
    }

    /// Moves the camera within the target frame without touching the enable flag.
    pub fn set_pan_offset(&mut self, pan: Vec2) {
        if pan.is_finite() {
            self.pan = pan;
        }
    }

    pub fn zoom(&self) -> f32 {
        self.camera.zoom
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    pub fn set_viewport_size(&mut self, size: Vec2) {
        if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
            self.viewport_size = size;
        }
    }

    /// Attaches the camera to a cuboid, reframing it unless it is the cuboid
    /// already attached.
    pub fn attach(&mut self, handle: &CuboidHandle, pose: &CuboidPose) -> Result<AttachKind, ViewError> {
        if !pose.has_positive_scale() {
            return Err(CuboidError::NonPositiveScale {
                id: handle.id.clone(),
                scale: pose.scale,
            }
            .into());
        }

        let same_target = self.target.as_ref().is_some_and(|t| t.entity == handle.entity)
            && self.editing_id.as_ref() == Some(&handle.id);
        if same_target {
            adjust_far(self.view, &mut self.camera, pose.scale);
            return Ok(AttachKind::Adjusted);
        }

        self.target = Some(handle.clone());
        self.editing_id = Some(handle.id.clone());
        self.pan = Vec2::ZERO;
        self.camera.transform.translation = Vec3::ZERO;
        self.camera.zoom = fit_zoom(self.view, self.viewport_size, pose.scale)
            .clamp(self.min_zoom, self.max_zoom);
        adjust(self.view, &mut self.camera, pose.scale);

        info!(
            "{} view attached to cuboid '{}' (zoom {:.1})",
            self.view, handle.id, self.camera.zoom
        );
        Ok(AttachKind::Reframed)
    }

    /// Releases the target and returns the camera to its standoff. Returns
    /// whether anything was attached.
    pub fn detach(&mut self) -> bool {
        let was_attached = self.target.take().is_some();
        self.editing_id = None;
        self.pan = Vec2::ZERO;
        reset(self.view, &mut self.camera);
        if was_attached {
            info!("{} view detached", self.view);
        }
        was_attached
    }

    /// Follows a pose change of the attached cuboid (depth range only).
    pub fn refresh(&mut self, pose: &CuboidPose) {
        if self.target.is_some() {
            adjust_far(self.view, &mut self.camera, pose.scale);
        }
    }

    /// Full reframe of the current target at the current pan and zoom.
    pub fn reframe(&mut self, pose: &CuboidPose) {
        if self.target.is_some() {
            adjust(self.view, &mut self.camera, pose.scale);
        }
    }

    /// Pans by a pointer delta in logical pixels (screen y down); the
    /// content follows the pointer.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if !self.enabled || self.camera.zoom <= 0.0 {
            return;
        }
        let delta = Vec2::new(-dx, dy) / self.camera.zoom;
        if delta.is_finite() {
            self.pan += delta;
        }
    }

    /// Multiplies the zoom by `scale`, or divides it when `reverse` is set.
    pub fn dolly(&mut self, scale: f32, reverse: bool) {
        if !self.enabled || !scale.is_finite() || scale <= 0.0 {
            return;
        }
        let zoom = if reverse {
            self.camera.zoom / scale
        } else {
            self.camera.zoom * scale
        };
        self.camera.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.camera.request_projection_update(ProjectionUpdate::Full);
    }

    /// Applies the pan offset to the camera transform. Returns whether the
    /// camera moved, zoomed or changed depth since the previous update.
    pub fn update(&mut self) -> bool {
        let depth = self.camera.transform.translation.dot(self.view.eye());
        self.camera.transform.translation =
            self.view.from_in_plane(self.pan) + self.view.eye() * depth;
        self.camera.transform.rotation = self.view.camera_rotation();

        let snapshot = (
            self.camera.transform.translation,
            self.camera.zoom,
            self.camera.far,
        );
        let changed = match self.last_snapshot {
            Some((translation, zoom, far)) => {
                translation.distance(snapshot.0) > CHANGE_EPSILON
                    || (zoom - snapshot.1).abs() > CHANGE_EPSILON
                    || (far - snapshot.2).abs() > CHANGE_EPSILON
            }
            None => true,
        };
        self.last_snapshot = Some(snapshot);
        changed
    }

    pub fn take_projection_update(&mut self) -> ProjectionUpdate {
        self.camera.take_projection_update()
    }

    /// Camera transform in the space the target's root lives in.
    pub fn camera_frame(&self, target_root: Option<&Transform>) -> Transform {
        let local = Transform {
            translation: self.view.from_in_plane(self.pan)
                + self.view.eye() * self.camera.transform.translation.dot(self.view.eye()),
            rotation: self.view.camera_rotation(),
            scale: Vec3::ONE,
        };
        match (target_root, &self.target) {
            (Some(root), Some(_)) => root.mul_transform(local),
            _ => local,
        }
    }

    pub fn cursor_ray(&self, frame: &Transform, cursor: Vec2) -> Option<Ray3d> {
        self.camera.ray(frame, cursor, self.viewport_size)
    }

    pub fn project(&self, frame: &Transform, point: Vec3) -> Vec2 {
        self.camera.project(frame, point, self.viewport_size)
    }
}

/// Rejects view cameras spawned with anything but an orthographic projection.
pub fn validate_view_projections(
    cameras: Query<(Entity, &Projection), Added<ViewCameraController>>,
) -> Result {
    for (entity, projection) in &cameras {
        if !matches!(projection, Projection::Orthographic(_)) {
            return Err(ViewError::UnsupportedProjection(entity).into());
        }
    }
    Ok(())
}

/// Copies controller state onto the camera entity's `Transform` and
/// `Projection`, composing with the target root so the camera follows it.
pub fn sync_view_cameras(
    mut cameras: Query<
        (
            Entity,
            &mut ViewCameraController,
            &mut Transform,
            Option<&mut Projection>,
            Option<&Camera>,
        ),
        Without<CuboidNode>,
    >,
    roots: Query<&Transform, (With<CuboidNode>, Without<ViewCameraController>)>,
    mut changed: EventWriter<ViewChanged>,
) {
    for (entity, mut controller, mut transform, projection, camera) in &mut cameras {
        if let Some(size) = camera.and_then(|c| c.logical_viewport_size()) {
            controller.set_viewport_size(size);
        }

        let moved = controller.update();
        let root = controller.target().and_then(|t| roots.get(t.entity).ok());
        let frame = controller.camera_frame(root);
        if *transform != frame {
            *transform = frame;
        }

        let update = controller.take_projection_update();
        if let Some(mut projection) = projection {
            match update {
                ProjectionUpdate::Full => {
                    *projection =
                        Projection::Orthographic(controller.camera().orthographic_projection());
                }
                ProjectionUpdate::FarOnly => {
                    if let Projection::Orthographic(ortho) = &mut *projection {
                        ortho.near = controller.camera().near;
                        ortho.far = controller.camera().far;
                    }
                }
                ProjectionUpdate::None => {}
            }
        }

        if moved || update != ProjectionUpdate::None {
            changed.write(ViewChanged { view: entity });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn handle(id: &str, index: u32) -> CuboidHandle {
        CuboidHandle {
            id: CuboidId::from(id),
            entity: Entity::from_raw(index),
        }
    }

    fn pose(scale: Vec3) -> CuboidPose {
        CuboidPose::new(Vec3::ZERO, Vec3::ZERO, scale)
    }

    #[test]
    fn attach_twice_is_idempotent() {
        let mut controller =
            ViewCameraController::new(ViewAxis::Top).with_viewport_size(Vec2::new(800.0, 600.0));
        let a = handle("a", 1);
        let p = pose(Vec3::new(2.0, 1.0, 1.0));

        assert_eq!(controller.attach(&a, &p), Ok(AttachKind::Reframed));
        controller.update();
        let framed = controller.camera().clone();
        let zoom = controller.zoom();

        assert_eq!(controller.attach(&a, &p), Ok(AttachKind::Adjusted));
        assert!(!controller.update());
        assert_eq!(controller.camera().transform, framed.transform);
        assert_relative_eq!(controller.zoom(), zoom);
    }

    #[test]
    fn attaching_another_target_resets_pan_and_refits() {
        let mut controller =
            ViewCameraController::new(ViewAxis::Top).with_viewport_size(Vec2::new(800.0, 600.0));
        controller.attach(&handle("a", 1), &pose(Vec3::new(2.0, 1.0, 1.0))).unwrap();
        controller.pan(40.0, -20.0);
        assert_ne!(controller.pan_offset(), Vec2::ZERO);

        let b_scale = Vec3::new(4.0, 4.0, 2.0);
        controller.attach(&handle("b", 2), &pose(b_scale)).unwrap();
        controller.update();
        assert_eq!(controller.pan_offset(), Vec2::ZERO);
        assert_relative_eq!(
            controller.zoom(),
            fit_zoom(ViewAxis::Top, Vec2::new(800.0, 600.0), b_scale)
        );
        assert!(controller.camera().transform.translation.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn attach_rejects_non_positive_extent() {
        let mut controller = ViewCameraController::new(ViewAxis::Front);
        let result = controller.attach(&handle("a", 1), &pose(Vec3::new(1.0, -1.0, 1.0)));
        assert!(matches!(result, Err(ViewError::InvalidTarget(_))));
        assert!(controller.target().is_none());
    }

    #[test]
    fn detach_is_idempotent() {
        let mut controller = ViewCameraController::new(ViewAxis::Front);
        controller.attach(&handle("a", 1), &pose(Vec3::ONE)).unwrap();

        assert!(controller.detach());
        controller.update();
        let first = controller.camera().clone();
        assert!(!controller.detach());
        controller.update();
        assert_eq!(controller.camera().transform, first.transform);
        assert!(controller.camera().transform.translation.abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-6));
        assert_relative_eq!(controller.camera().far, 20.0);
    }

    #[test]
    fn pan_follows_pointer_and_respects_enable() {
        let mut controller = ViewCameraController::new(ViewAxis::Top);
        controller.attach(&handle("a", 1), &pose(Vec3::ONE)).unwrap();
        let zoom = controller.zoom();

        controller.pan(zoom, 0.0);
        assert!(controller.pan_offset().abs_diff_eq(Vec2::new(-1.0, 0.0), 1e-6));

        controller.set_enabled(false);
        controller.pan(zoom, zoom);
        controller.dolly(2.0, false);
        assert!(controller.pan_offset().abs_diff_eq(Vec2::new(-1.0, 0.0), 1e-6));
        assert_relative_eq!(controller.zoom(), zoom);
    }

    #[test]
    fn dolly_is_clamped() {
        let mut controller = ViewCameraController::new(ViewAxis::Side).with_zoom_bounds(10.0, 100.0);
        controller.dolly(1000.0, false);
        assert_relative_eq!(controller.zoom(), 100.0);
        controller.dolly(1000.0, true);
        assert_relative_eq!(controller.zoom(), 10.0);
    }

    #[test]
    fn camera_frame_follows_target_root() {
        let mut controller = ViewCameraController::new(ViewAxis::Top);
        controller.attach(&handle("a", 1), &pose(Vec3::new(1.0, 1.0, 2.0))).unwrap();
        controller.update();

        let root = Transform::from_xyz(5.0, 0.0, 0.0).with_rotation(Quat::from_rotation_z(1.0));
        let frame = controller.camera_frame(Some(&root));
        assert!(frame.translation.abs_diff_eq(Vec3::new(5.0, 0.0, 1.0), 1e-6));
        assert!(frame.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }
}
