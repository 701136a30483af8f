//! Editing tools layered over the view cameras.
//!
//! ## Frame flow
//!
//! ```text
//! window input ─> route_window_pointer ─> ViewPointerEvent
//!                                              │
//! SelectCuboid ─> apply_cuboid_selection       │
//!                        │                     v
//!                        └──────> handle_view_pointer_events ─> CuboidPoseChanged
//!                                              │
//!                          follow_attached_targets (gizmos, depth range)
//!                                              │
//!                          sync_view_cameras ─> ViewChanged
//! ```
//!
//! [`CuboidEditorPlugin`] carries everything needed to edit headlessly:
//! events in, events out. [`CuboidEditorInputPlugin`] adds window input,
//! handle meshes and the orbit view for an interactive app.

/// Handle layout, picking and opacity rules.
pub mod gizmo;

/// Window input routing and view navigation.
pub mod input;

/// Ray intersection against oriented handle boxes.
pub mod ray;

/// Selection events and keyboard shortcuts.
pub mod selection;

/// Pointer interaction state machine and drag commits.
pub mod transform;

use bevy::prelude::*;

use crate::engine::camera::ViewControlSettings;
use crate::engine::camera::orbit_camera::{
    OrbitViewCamera, focus_orbit_on_selection, orbit_camera_controller,
};
use crate::engine::camera::view_camera::{
    ViewChanged, sync_view_cameras, validate_view_projections,
};
use gizmo::GizmoSettings;
use gizmo::render::{spawn_gizmo_handle_meshes, sync_gizmo_handle_meshes};
use input::{PointerCapture, apply_view_control_settings, navigate_views, route_window_pointer};
use selection::{SelectCuboid, apply_cuboid_selection, handle_selection_keyboard_shortcuts};
use transform::{
    CuboidPoseChanged, DragOwner, ViewPointerEvent, follow_attached_targets,
    handle_view_pointer_events,
};

/// Ordering of the editor's systems within `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CuboidEditorSet {
    /// Window input becomes view events.
    Input,
    /// Selection, drags and camera sync.
    Edit,
    /// Mesh mirrors of the edit state.
    Render,
}

/// Headless core: selection, pointer interaction and view cameras.
pub struct CuboidEditorPlugin;

impl Plugin for CuboidEditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DragOwner>()
            .init_resource::<GizmoSettings>()
            .init_resource::<ViewControlSettings>()
            .add_event::<SelectCuboid>()
            .add_event::<ViewPointerEvent>()
            .add_event::<CuboidPoseChanged>()
            .add_event::<ViewChanged>()
            .configure_sets(
                Update,
                (
                    CuboidEditorSet::Input,
                    CuboidEditorSet::Edit,
                    CuboidEditorSet::Render,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    validate_view_projections,
                    apply_cuboid_selection,
                    handle_view_pointer_events,
                    follow_attached_targets,
                    sync_view_cameras,
                )
                    .chain()
                    .in_set(CuboidEditorSet::Edit),
            );
    }
}

/// Interactive front end: window input, handle meshes and the orbit view.
pub struct CuboidEditorInputPlugin;

impl Plugin for CuboidEditorInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerCapture>()
            .init_resource::<OrbitViewCamera>()
            .add_systems(
                Update,
                (
                    route_window_pointer,
                    navigate_views,
                    apply_view_control_settings,
                    handle_selection_keyboard_shortcuts,
                )
                    .chain()
                    .in_set(CuboidEditorSet::Input),
            )
            .add_systems(
                Update,
                (
                    spawn_gizmo_handle_meshes,
                    sync_gizmo_handle_meshes,
                    focus_orbit_on_selection,
                    orbit_camera_controller,
                )
                    .chain()
                    .in_set(CuboidEditorSet::Render),
            );
    }
}
