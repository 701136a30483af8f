/// Distance from the origin a detached view camera sits at (world units).
pub const VIEW_STANDOFF: f32 = 10.0;

/// Far plane of a detached view camera.
pub const FREE_FAR_PLANE: f32 = VIEW_STANDOFF * 2.0;

/// Extra depth kept visible behind the far face of an attached cuboid.
pub const FAR_MARGIN: f32 = 0.5;

/// Depth kept visible in front of the camera-facing face, so handles sitting
/// on that face are never clipped by the near plane.
pub const NEAR_MARGIN: f32 = 0.1;

/// In-plane extents are multiplied by this before fitting them to a viewport.
pub const FIT_PADDING: f32 = 1.5;

/// Orthographic zoom, in logical pixels per world unit.
pub const DEFAULT_ZOOM: f32 = 40.0;
pub const MIN_ZOOM: f32 = 2.0;
pub const MAX_ZOOM: f32 = 4000.0;

/// Multiplicative zoom change per wheel line.
pub const WHEEL_ZOOM_STEP: f32 = 0.9;

/// Pixel scroll events are converted to lines with this factor.
pub const PIXELS_PER_WHEEL_LINE: f32 = 20.0;

/// Pan speed multiplier applied to pointer deltas.
pub const PAN_SPEED: f32 = 1.0;

/// Smallest camera motion reported as a view change.
pub const CHANGE_EPSILON: f32 = 1e-5;

/// Smallest extent a scale drag may produce on any axis.
pub const MIN_EXTENT: f32 = 0.01;

/// Picking rays start this far behind the camera plane so handles straddling
/// the plane are still hit from the front.
pub const RAY_PULL_BACK: f32 = 100.0;

/// Viewport assumed before the first frame reports a real size.
pub const DEFAULT_VIEWPORT_SIZE: [f32; 2] = [640.0, 480.0];
