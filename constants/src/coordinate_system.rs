use bevy::math::Vec3;

/// World up axis. Point clouds keep the sensor frame, which is Z-up.
pub const WORLD_UP: Vec3 = Vec3::Z;

/// Orthographic view basis as `[eye, right, up]`, expressed in the frame of
/// the cuboid being edited. `eye` points from the box towards the camera.
/// Each basis is right-handed: `right x up == eye`.
pub const TOP_VIEW_BASIS: [Vec3; 3] = [Vec3::Z, Vec3::X, Vec3::Y];
pub const SIDE_VIEW_BASIS: [Vec3; 3] = [Vec3::NEG_Y, Vec3::X, Vec3::Z];
pub const FRONT_VIEW_BASIS: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

/// Component index of the axis each view looks along (x = 0, y = 1, z = 2).
pub const TOP_VIEW_NORMAL_INDEX: usize = 2;
pub const SIDE_VIEW_NORMAL_INDEX: usize = 1;
pub const FRONT_VIEW_NORMAL_INDEX: usize = 0;
