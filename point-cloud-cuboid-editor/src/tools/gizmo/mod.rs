//! Screen-space handles drawn over the selected cuboid in each view.
//!
//! ## Layout
//!
//! Every handle sits on the face of the box that looks at the camera:
//!
//! ```text
//!              (R)            rotation point, a fixed pixel distance above the top edge
//!   S_TL ────────────── S_TR
//!    │                    │
//!    │       T_BOX        │   translate face covering the whole face
//!    │                    │
//!   S_BL ────────────── S_BR
//! ```
//!
//! Corner and rotation handles keep a constant size in pixels, so their world
//! size is recomputed from the view zoom on every update.
//!
//! ## Picking
//!
//! A separate, larger set of oriented boxes is ray-cast. Corners are deep
//! enough to stand in front of the thin translate face, so the nearest hit
//! wins without any priority rules.

/// Mesh entities mirroring each view's gizmo handles.
pub mod render;

use bevy::prelude::*;
use constants::gizmo::{
    COLD_OPACITY_FACTOR, CORNER_HANDLE_DEPTH, DISABLED_OPACITY_FACTOR, FACE_OPACITY,
    HANDLE_OPACITY, HANDLE_SIZE_PX, HOT_OPACITY, PICKING_TOLERANCE, ROTATION_HANDLE_OFFSET_PX,
    TRANSLATE_FACE_DEPTH_PX,
};

use crate::engine::cuboid::CuboidPose;
use crate::engine::view::ViewAxis;
use crate::tools::ray::ray_hits_obb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Direction of the corner on screen (x right, y up).
    pub fn screen_signs(self) -> Vec2 {
        match self {
            Corner::TopLeft => Vec2::new(-1.0, 1.0),
            Corner::TopRight => Vec2::new(1.0, 1.0),
            Corner::BottomLeft => Vec2::new(-1.0, -1.0),
            Corner::BottomRight => Vec2::new(1.0, -1.0),
        }
    }
}

/// Identifies a gizmo handle, and with it the operation a drag performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleId {
    Translate,
    Scale(Corner),
    Rotate,
}

impl HandleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleId::Translate => "T_BOX",
            HandleId::Scale(Corner::TopLeft) => "S_TL",
            HandleId::Scale(Corner::TopRight) => "S_TR",
            HandleId::Scale(Corner::BottomLeft) => "S_BL",
            HandleId::Scale(Corner::BottomRight) => "S_BR",
            HandleId::Rotate => "R_POINT",
        }
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle sizes and opacity levels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GizmoSettings {
    pub handle_size_px: f32,
    pub picking_tolerance: f32,
    pub rotation_offset_px: f32,
    pub handle_opacity: f32,
    pub face_opacity: f32,
    pub hot_opacity: f32,
    pub disabled_factor: f32,
    pub cold_factor: f32,
}

impl Default for GizmoSettings {
    fn default() -> Self {
        Self {
            handle_size_px: HANDLE_SIZE_PX,
            picking_tolerance: PICKING_TOLERANCE,
            rotation_offset_px: ROTATION_HANDLE_OFFSET_PX,
            handle_opacity: HANDLE_OPACITY,
            face_opacity: FACE_OPACITY,
            hot_opacity: HOT_OPACITY,
            disabled_factor: DISABLED_OPACITY_FACTOR,
            cold_factor: COLD_OPACITY_FACTOR,
        }
    }
}

/// One handle, positioned in the cuboid's parent space.
#[derive(Debug, Clone, PartialEq)]
pub struct GizmoHandle {
    pub id: HandleId,
    pub transform: Transform,
    pub opacity: f32,
    pub raycast_visible: bool,
    // Position on the box in unit-cube coordinates.
    anchor: Vec3,
}

/// The handle set of one view.
#[derive(Debug, Clone)]
pub struct CuboidGizmo {
    view: ViewAxis,
    handles: Vec<GizmoHandle>,
    picking: Vec<GizmoHandle>,
    settings: GizmoSettings,
    hot: Option<HandleId>,
    enabled: bool,
    shown: bool,
}

impl CuboidGizmo {
    pub fn new(view: ViewAxis, allow_rotation: bool) -> Self {
        let handles: Vec<GizmoHandle> = handle_layout(view, allow_rotation)
            .into_iter()
            .map(|(id, anchor)| GizmoHandle {
                id,
                transform: Transform::IDENTITY,
                opacity: 0.0,
                raycast_visible: true,
                anchor,
            })
            .collect();

        let mut gizmo = Self {
            view,
            picking: handles.clone(),
            handles,
            settings: GizmoSettings::default(),
            hot: None,
            enabled: true,
            shown: false,
        };
        gizmo.refresh_opacity();
        gizmo
    }

    pub fn view(&self) -> ViewAxis {
        self.view
    }

    /// Visible handles.
    pub fn handles(&self) -> &[GizmoHandle] {
        &self.handles
    }

    pub fn picking_handles(&self) -> &[GizmoHandle] {
        &self.picking
    }

    pub fn handle(&self, id: HandleId) -> Option<&GizmoHandle> {
        self.handles.iter().find(|h| h.id == id)
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn hot(&self) -> Option<HandleId> {
        self.hot
    }

    pub fn set_hot(&mut self, hot: Option<HandleId>) {
        if self.hot != hot {
            self.hot = hot;
            self.refresh_opacity();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.refresh_opacity();
        }
    }

    pub fn hide(&mut self) {
        self.shown = false;
    }

    /// Places every handle for `pose` at the view's current `zoom`.
    pub fn update(&mut self, pose: &CuboidPose, zoom: f32, settings: &GizmoSettings) {
        if !zoom.is_finite() || zoom <= 0.0 {
            self.shown = false;
            return;
        }
        if self.settings != *settings {
            self.settings = *settings;
            self.refresh_opacity();
        }

        let pixel = 1.0 / zoom;
        let view = self.view;
        let rotation = pose.rotation_quat();
        let facing = rotation * view.camera_rotation();
        let settings = self.settings;

        let place = |handle: &mut GizmoHandle, size_factor: f32| {
            let mut local = handle.anchor * pose.scale;
            if handle.id == HandleId::Rotate {
                local += view.up() * settings.rotation_offset_px * pixel;
            }
            let size = settings.handle_size_px * pixel * size_factor;
            let scale = match handle.id {
                HandleId::Translate => view
                    .in_plane_extent(pose.scale)
                    .extend(TRANSLATE_FACE_DEPTH_PX * pixel),
                HandleId::Scale(_) | HandleId::Rotate => Vec3::splat(size),
            };
            handle.transform = Transform {
                translation: pose.position + rotation * local,
                rotation: facing,
                scale,
            };
        };

        for handle in &mut self.handles {
            place(handle, 1.0);
            if handle.id != HandleId::Translate {
                handle.transform.scale.z *= CORNER_HANDLE_DEPTH;
            }
        }
        for handle in &mut self.picking {
            place(handle, settings.picking_tolerance);
        }
        self.shown = true;
    }

    /// Nearest pickable handle along `ray`.
    pub fn pick(&self, ray: &Ray3d) -> Option<HandleId> {
        if !self.shown {
            return None;
        }
        self.picking
            .iter()
            .filter(|handle| handle.raycast_visible)
            .filter_map(|handle| ray_hits_obb(ray, &handle.transform).map(|t| (handle.id, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn refresh_opacity(&mut self) {
        let settings = self.settings;
        let (enabled, hot) = (self.enabled, self.hot);
        for handle in self.handles.iter_mut().chain(self.picking.iter_mut()) {
            let base = match handle.id {
                HandleId::Translate => settings.face_opacity,
                HandleId::Scale(_) | HandleId::Rotate => settings.handle_opacity,
            };
            handle.opacity = if !enabled {
                base * settings.disabled_factor
            } else {
                match hot {
                    Some(id) if id == handle.id => settings.hot_opacity,
                    Some(_) => base * settings.cold_factor,
                    None => base,
                }
            };
        }
    }
}

/// Handles of a view and where they sit on the unit cube.
fn handle_layout(view: ViewAxis, allow_rotation: bool) -> Vec<(HandleId, Vec3)> {
    let face = view.eye() * 0.5;
    let mut layout = vec![(HandleId::Translate, face)];
    layout.extend(Corner::ALL.into_iter().map(|corner| {
        let signs = corner.screen_signs() * 0.5;
        (
            HandleId::Scale(corner),
            face + view.right() * signs.x + view.up() * signs.y,
        )
    }));
    if allow_rotation {
        layout.push((HandleId::Rotate, face + view.up() * 0.5));
    }
    layout
}
