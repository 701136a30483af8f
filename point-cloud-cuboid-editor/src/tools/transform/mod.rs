//! Pointer interaction with the gizmo of one view.
//!
//! ## State machine
//!
//! ```text
//! Idle ──pointer over handle──> Hovering(handle) ──primary down──> Dragging(session)
//!   ^ ^                             │                                  │
//!   │ └────pointer off handles──────┘                                  │
//!   └─────────────────────────── primary up ───────────────────────────┘
//! ```
//!
//! While dragging, the handle never changes: hover results are ignored until
//! the primary button is released. Every drag step is computed from the pose
//! and camera frame captured when the drag started, never from the previous
//! step, so steps do not accumulate error.
//!
//! ## Drag ownership
//!
//! Only one view may drag at a time. A view takes the [`DragOwner`] token on
//! pointer-down and gives it back on pointer-up; a pointer-down in any other
//! view while the token is held is ignored.

/// Pose math for translate, rotate and corner scale drags.
pub mod drag;

use bevy::prelude::*;

use crate::engine::camera::view_camera::ViewCameraController;
use crate::engine::cuboid::{CuboidGeometry, CuboidHandle, CuboidPose};
use crate::engine::error::CuboidError;
use crate::engine::view::ViewAxis;
use crate::tools::gizmo::{CuboidGizmo, GizmoSettings, HandleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Move,
    Down(PointerButton),
    Up(PointerButton),
}

/// Pointer input for one view, in logical pixels relative to the view's
/// top-left corner.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ViewPointerEvent {
    pub view: Entity,
    pub kind: PointerEventKind,
    pub position: Vec2,
}

/// Emitted after every committed drag step.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CuboidPoseChanged {
    pub handle: CuboidHandle,
    pub pose: [f32; 9],
}

/// Single-drag token shared by all views.
#[derive(Resource, Debug, Default)]
pub struct DragOwner {
    view: Option<Entity>,
}

impl DragOwner {
    pub fn owner(&self) -> Option<Entity> {
        self.view
    }

    pub fn is_held(&self) -> bool {
        self.view.is_some()
    }

    /// Takes the token for `view`. Succeeds when free or already held by `view`.
    pub fn try_acquire(&mut self, view: Entity) -> bool {
        match self.view {
            Some(owner) => owner == view,
            None => {
                self.view = Some(view);
                true
            }
        }
    }

    pub fn release(&mut self, view: Entity) {
        if self.view == Some(view) {
            self.view = None;
        }
    }
}

/// Per-view editing options fixed at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewEditOptions {
    pub allow_rotation: bool,
}

impl Default for ViewEditOptions {
    fn default() -> Self {
        Self {
            allow_rotation: true,
        }
    }
}

/// Everything captured when a drag starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub handle: HandleId,
    /// Plane hit at pointer-down, relative to the box centre.
    pub point_start: Vec3,
    pub start_pose: CuboidPose,
    pub camera_frame: Transform,
    pub start_pan: Vec2,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovering(HandleId),
    Dragging(DragSession),
}

/// Result of one drag step: the pose to commit and, for drags that move the
/// box, the pan offset that keeps the camera fixed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct DragStep {
    pub pose: CuboidPose,
    pub camera_pan: Option<Vec2>,
}

/// Gizmo plus interaction state of one view camera.
#[derive(Component, Debug, Clone)]
pub struct TransformInteraction {
    view: ViewAxis,
    gizmo: CuboidGizmo,
    state: InteractionState,
    enabled: bool,
}

impl TransformInteraction {
    pub fn new(view: ViewAxis, options: ViewEditOptions) -> Self {
        Self {
            view,
            gizmo: CuboidGizmo::new(view, options.allow_rotation),
            state: InteractionState::Idle,
            enabled: true,
        }
    }

    pub fn view(&self) -> ViewAxis {
        self.view
    }

    pub fn gizmo(&self) -> &CuboidGizmo {
        &self.gizmo
    }

    pub fn gizmo_mut(&mut self) -> &mut CuboidGizmo {
        &mut self.gizmo
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging(_))
    }

    /// Handle being dragged, or else the one under the pointer.
    pub fn active_handle(&self) -> Option<HandleId> {
        match &self.state {
            InteractionState::Idle => None,
            InteractionState::Hovering(handle) => Some(*handle),
            InteractionState::Dragging(session) => Some(session.handle),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling keeps a drag in progress alive until the button is released.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.gizmo.set_enabled(enabled);
        if !enabled && !self.is_dragging() {
            self.state = InteractionState::Idle;
            self.gizmo.set_hot(None);
        }
    }

    pub fn drag_camera_frame(&self) -> Option<Transform> {
        match &self.state {
            InteractionState::Dragging(session) => Some(session.camera_frame),
            _ => None,
        }
    }

    /// Updates the hovered handle. Ignored while dragging.
    pub fn hover(&mut self, ray: Option<&Ray3d>) -> Option<HandleId> {
        if let InteractionState::Dragging(session) = &self.state {
            return Some(session.handle);
        }
        let hit = if self.enabled {
            ray.and_then(|ray| self.gizmo.pick(ray))
        } else {
            None
        };
        self.state = match hit {
            Some(handle) => InteractionState::Hovering(handle),
            None => InteractionState::Idle,
        };
        self.gizmo.set_hot(hit);
        hit
    }

    /// Hovers, or while dragging computes the next step. A ray that misses
    /// the drag plane is a no-op.
    pub fn pointer_move(&mut self, ray: Option<&Ray3d>) -> Option<DragStep> {
        if self.is_dragging() {
            ray.and_then(|ray| self.drag_to(ray))
        } else {
            self.hover(ray);
            None
        }
    }

    /// Starts a drag when the primary button goes down over a handle.
    pub fn pointer_down(
        &mut self,
        button: PointerButton,
        ray: Option<&Ray3d>,
        pose: &CuboidPose,
        camera_frame: Transform,
        pan: Vec2,
    ) -> bool {
        if !self.enabled || button != PointerButton::Primary || self.is_dragging() {
            return false;
        }
        let Some(ray) = ray else {
            return false;
        };
        let Some(handle) = self.hover(Some(ray)) else {
            return false;
        };
        let plane = InfinitePlane3d {
            normal: camera_frame.back(),
        };
        let Some(distance) = ray.intersect_plane(pose.position, plane) else {
            return false;
        };

        self.state = InteractionState::Dragging(DragSession {
            handle,
            point_start: ray.get_point(distance) - pose.position,
            start_pose: *pose,
            camera_frame,
            start_pan: pan,
        });
        self.gizmo.set_hot(Some(handle));
        true
    }

    /// Ends a drag. Returns the handle that was being dragged.
    pub fn pointer_up(&mut self, button: PointerButton) -> Option<HandleId> {
        if button != PointerButton::Primary {
            return None;
        }
        match std::mem::take(&mut self.state) {
            InteractionState::Dragging(session) => {
                self.gizmo.set_hot(None);
                Some(session.handle)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Drops any hover or drag without committing anything.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
        self.gizmo.set_hot(None);
    }

    fn drag_to(&self, ray: &Ray3d) -> Option<DragStep> {
        let InteractionState::Dragging(session) = &self.state else {
            return None;
        };
        let start = &session.start_pose;
        let frame = &session.camera_frame;
        let plane = InfinitePlane3d {
            normal: frame.back(),
        };
        let distance = ray.intersect_plane(start.position, plane)?;
        let point_end = ray.get_point(distance) - start.position;

        match session.handle {
            HandleId::Translate => {
                let (pose, offset) = drag::translate(self.view, start, session.point_start, point_end);
                Some(DragStep {
                    pose,
                    camera_pan: Some(session.start_pan - offset),
                })
            }
            HandleId::Scale(corner) => {
                let (pose, offset) =
                    drag::scale(self.view, corner, start, session.point_start, point_end);
                Some(DragStep {
                    pose,
                    camera_pan: Some(session.start_pan - offset),
                })
            }
            HandleId::Rotate => drag::rotate(*frame.forward(), start, session.point_start, point_end)
                .map(|pose| DragStep {
                    pose,
                    camera_pan: None,
                }),
        }
    }
}

/// Routes pointer events to each view's interaction and commits drag steps.
pub fn handle_view_pointer_events(
    mut pointer_events: EventReader<ViewPointerEvent>,
    mut geometry: CuboidGeometry,
    mut views: Query<(&mut ViewCameraController, &mut TransformInteraction)>,
    mut owner: ResMut<DragOwner>,
    settings: Res<GizmoSettings>,
    mut pose_changed: EventWriter<CuboidPoseChanged>,
) {
    for event in pointer_events.read() {
        let Ok((mut controller, mut interaction)) = views.get_mut(event.view) else {
            continue;
        };

        // Releasing always ends the drag, even when the pose can no longer be read.
        if let PointerEventKind::Up(button) = event.kind {
            if let Some(released) = interaction.pointer_up(button) {
                owner.release(event.view);
                let pose = controller
                    .target()
                    .and_then(|target| geometry.pose(target.entity).ok());
                if let Some(pose) = pose {
                    controller.reframe(&pose);
                }
                debug!("{} view finished dragging {released}", controller.view());
            }
            continue;
        }

        let Some(handle) = controller.target().cloned() else {
            continue;
        };
        let Ok(pose) = geometry.pose(handle.entity) else {
            interaction.gizmo_mut().hide();
            continue;
        };
        interaction
            .gizmo_mut()
            .update(&pose, controller.zoom(), &settings);
        let live_frame = controller.camera_frame(Some(&pose.root_transform()));

        match event.kind {
            PointerEventKind::Move => {
                let frame = interaction.drag_camera_frame().unwrap_or(live_frame);
                let ray = controller.cursor_ray(&frame, event.position);
                let Some(step) = interaction.pointer_move(ray.as_ref()) else {
                    continue;
                };

                match geometry.set_pose(handle.entity, &step.pose) {
                    Ok(committed) => {
                        if let Some(pan) = step.camera_pan {
                            controller.set_pan_offset(pan);
                        }
                        controller.refresh(&committed);
                        interaction
                            .gizmo_mut()
                            .update(&committed, controller.zoom(), &settings);
                        pose_changed.write(CuboidPoseChanged {
                            handle: handle.clone(),
                            pose: committed.to_array(),
                        });
                    }
                    Err(err) => warn!("Drag step on cuboid '{}' rejected: {err}", handle.id),
                }
            }
            PointerEventKind::Down(button) => {
                if owner.owner().is_some_and(|view| view != event.view) {
                    continue;
                }
                let ray = controller.cursor_ray(&live_frame, event.position);
                let pan = controller.pan_offset();
                if interaction.pointer_down(button, ray.as_ref(), &pose, live_frame, pan)
                    && owner.try_acquire(event.view)
                {
                    debug!(
                        "{} view started dragging {} on cuboid '{}'",
                        controller.view(),
                        interaction.active_handle().map_or("-", |h| h.as_str()),
                        handle.id
                    );
                }
            }
            // resolved above
            PointerEventKind::Up(_) => {}
        }
    }
}

/// Keeps gizmos on their cuboid and re-fits the depth range of every view
/// after outside edits. Views whose cuboid was despawned detach.
pub fn follow_attached_targets(
    geometry: CuboidGeometry,
    mut views: Query<(Entity, &mut ViewCameraController, &mut TransformInteraction)>,
    mut owner: ResMut<DragOwner>,
    settings: Res<GizmoSettings>,
) {
    let drag_in_progress = owner.is_held();

    for (view, mut controller, mut interaction) in &mut views {
        let Some(target) = controller.target().cloned() else {
            interaction.gizmo_mut().hide();
            continue;
        };

        match geometry.pose(target.entity) {
            Ok(pose) => {
                if !drag_in_progress {
                    controller.refresh(&pose);
                }
                interaction
                    .gizmo_mut()
                    .update(&pose, controller.zoom(), &settings);
            }
            Err(CuboidError::NotACuboid(_)) => {
                info!(
                    "Cuboid '{}' no longer exists, detaching {} view",
                    target.id,
                    controller.view()
                );
                controller.detach();
                interaction.cancel();
                interaction.gizmo_mut().hide();
                owner.release(view);
            }
            Err(err) => {
                debug!("{} view cannot show its gizmo: {err}", controller.view());
                if interaction.is_dragging() {
                    interaction.cancel();
                    owner.release(view);
                }
                interaction.gizmo_mut().hide();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::gizmo::Corner;

    fn pose() -> CuboidPose {
        CuboidPose::new(Vec3::ZERO, Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0))
    }

    fn top_frame() -> Transform {
        Transform::from_xyz(0.0, 0.0, 0.5).with_rotation(ViewAxis::Top.camera_rotation())
    }

    fn ray_at(x: f32, y: f32) -> Ray3d {
        Ray3d::new(Vec3::new(x, y, 100.0), Dir3::NEG_Z)
    }

    fn interaction() -> TransformInteraction {
        let mut interaction = TransformInteraction::new(ViewAxis::Top, ViewEditOptions::default());
        interaction
            .gizmo_mut()
            .update(&pose(), 100.0, &GizmoSettings::default());
        interaction
    }

    #[test]
    fn hover_then_drag_then_release() {
        let mut interaction = interaction();
        assert_eq!(interaction.hover(Some(&ray_at(1.0, -0.5))), Some(HandleId::Scale(Corner::BottomRight)));

        assert!(interaction.pointer_down(
            PointerButton::Primary,
            Some(&ray_at(1.0, -0.5)),
            &pose(),
            top_frame(),
            Vec2::ZERO
        ));
        assert!(interaction.is_dragging());

        let step = interaction.pointer_move(Some(&ray_at(1.4, -0.7))).unwrap();
        assert!(step.pose.scale.abs_diff_eq(Vec3::new(2.4, 1.2, 1.0), 1e-5));

        assert_eq!(
            interaction.pointer_up(PointerButton::Primary),
            Some(HandleId::Scale(Corner::BottomRight))
        );
        assert_eq!(*interaction.state(), InteractionState::Idle);
        assert_eq!(interaction.gizmo().hot(), None);
    }

    #[test]
    fn hover_cannot_steal_an_active_drag() {
        let mut interaction = interaction();
        interaction.pointer_down(
            PointerButton::Primary,
            Some(&ray_at(-1.0, 0.5)),
            &pose(),
            top_frame(),
            Vec2::ZERO,
        );

        // pointer now over the translate face
        interaction.pointer_move(Some(&ray_at(0.0, 0.0)));
        assert_eq!(interaction.active_handle(), Some(HandleId::Scale(Corner::TopLeft)));
        assert_eq!(interaction.hover(Some(&ray_at(0.0, 0.0))), Some(HandleId::Scale(Corner::TopLeft)));
        assert_eq!(interaction.gizmo().hot(), Some(HandleId::Scale(Corner::TopLeft)));
    }

    #[test]
    fn only_primary_button_drags() {
        let mut interaction = interaction();
        for button in [PointerButton::Secondary, PointerButton::Middle] {
            assert!(!interaction.pointer_down(button, Some(&ray_at(0.0, 0.0)), &pose(), top_frame(), Vec2::ZERO));
        }
        assert!(!interaction.is_dragging());
        assert_eq!(interaction.pointer_up(PointerButton::Primary), None);
    }

    #[test]
    fn translate_drag_compensates_camera_pan() {
        let mut interaction = interaction();
        let pan = Vec2::new(0.25, 0.0);
        interaction.pointer_down(PointerButton::Primary, Some(&ray_at(0.0, 0.0)), &pose(), top_frame(), pan);

        let step = interaction.pointer_move(Some(&ray_at(0.5, 0.2))).unwrap();
        assert!(step.pose.position.abs_diff_eq(Vec3::new(0.5, 0.2, 0.0), 1e-5));
        assert!(step.camera_pan.unwrap().abs_diff_eq(Vec2::new(-0.25, -0.2), 1e-5));
    }

    #[test]
    fn disabled_interaction_ignores_pointer() {
        let mut interaction = interaction();
        interaction.set_enabled(false);
        assert_eq!(interaction.hover(Some(&ray_at(0.0, 0.0))), None);
        assert!(!interaction.pointer_down(
            PointerButton::Primary,
            Some(&ray_at(0.0, 0.0)),
            &pose(),
            top_frame(),
            Vec2::ZERO
        ));
    }

    #[test]
    fn drag_owner_is_exclusive() {
        let mut owner = DragOwner::default();
        let (a, b) = (Entity::from_raw(1), Entity::from_raw(2));
        assert!(owner.try_acquire(a));
        assert!(!owner.try_acquire(b));
        owner.release(b);
        assert_eq!(owner.owner(), Some(a));
        owner.release(a);
        assert!(owner.try_acquire(b));
    }
}
