//! Cameras of the cuboid editor.
//!
//! Each orthographic view camera carries a [`view_camera::ViewCameraController`]
//! that frames the selected cuboid along a fixed axis and lives in the cuboid's
//! frame while attached. A free perspective orbit view gives spatial context
//! and never edits.
//!
//! ## Framing
//!
//! - Detached: the camera sits `VIEW_STANDOFF` units out along the view's eye
//!   direction, far plane at twice that.
//! - Attached: the camera sits on the camera-facing face of the box and its
//!   depth range covers the box plus `FAR_MARGIN`. Zoom is fitted to the box
//!   when the target changes and left alone while the same box is edited.

/// Framing helpers and the orthographic camera value they operate on.
pub mod framing;

/// Perspective orbit view used for spatial context.
pub mod orbit_camera;

/// Per-view orthographic camera controller and its sync systems.
pub mod view_camera;

use bevy::prelude::*;
use constants::framing::{MAX_ZOOM, MIN_ZOOM, PAN_SPEED, PIXELS_PER_WHEEL_LINE, WHEEL_ZOOM_STEP};

/// Runtime-tunable navigation settings shared by all views.
#[derive(Resource, Debug, Clone)]
pub struct ViewControlSettings {
    pub pan_speed: f32,
    pub zoom_step: f32,
    pub pixels_per_line: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ViewControlSettings {
    fn default() -> Self {
        Self {
            pan_speed: PAN_SPEED,
            zoom_step: WHEEL_ZOOM_STEP,
            pixels_per_line: PIXELS_PER_WHEEL_LINE,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}
