/// Edge length of corner and rotation handles, in logical pixels.
pub const HANDLE_SIZE_PX: f32 = 10.0;

/// Picking handles are this much larger than the visible ones.
pub const PICKING_TOLERANCE: f32 = 1.8;

/// Screen distance between the top edge of the box and the rotation handle.
pub const ROTATION_HANDLE_OFFSET_PX: f32 = 28.0;

/// Depth of the translate face handle, in logical pixels. Kept well below the
/// corner handle size so corners are always hit first where they overlap.
pub const TRANSLATE_FACE_DEPTH_PX: f32 = 1.0;

/// Depth of corner handles relative to their edge length.
pub const CORNER_HANDLE_DEPTH: f32 = 0.25;

/// Resting opacity of corner and rotation handles.
pub const HANDLE_OPACITY: f32 = 0.7;

/// Resting opacity of the translate face.
pub const FACE_OPACITY: f32 = 0.15;

/// Opacity of the handle under the pointer or being dragged.
pub const HOT_OPACITY: f32 = 1.0;

/// Resting opacity multiplier while the gizmo is disabled.
pub const DISABLED_OPACITY_FACTOR: f32 = 0.5;

/// Resting opacity multiplier for handles other than the hot one.
pub const COLD_OPACITY_FACTOR: f32 = 0.25;

/// First render layer used for per-view gizmo meshes. View `n` draws its
/// handles on layer `GIZMO_RENDER_LAYER_BASE + n`.
pub const GIZMO_RENDER_LAYER_BASE: usize = 1;
