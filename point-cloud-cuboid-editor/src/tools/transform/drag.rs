use bevy::prelude::*;
use constants::framing::MIN_EXTENT;

use crate::engine::cuboid::CuboidPose;
use crate::engine::view::ViewAxis;
use crate::tools::gizmo::Corner;

/// Below this length a rotation lever has no usable direction.
const LEVER_EPSILON: f32 = 1e-6;

/// Box-frame direction in which dragging `corner` grows the box. The axis the
/// view looks along is always 0.
pub fn corner_signs(view: ViewAxis, corner: Corner) -> Vec3 {
    match (view, corner) {
        (ViewAxis::Top, Corner::TopLeft) => Vec3::new(-1.0, 1.0, 0.0),
        // top-right grows along both screen axes as-is
        (ViewAxis::Top, Corner::TopRight) => Vec3::new(1.0, 1.0, 0.0),
        (ViewAxis::Top, Corner::BottomLeft) => Vec3::new(-1.0, -1.0, 0.0),
        (ViewAxis::Top, Corner::BottomRight) => Vec3::new(1.0, -1.0, 0.0),
        (ViewAxis::Side, Corner::TopLeft) => Vec3::new(-1.0, 0.0, 1.0),
        (ViewAxis::Side, Corner::TopRight) => Vec3::new(1.0, 0.0, 1.0),
        (ViewAxis::Side, Corner::BottomLeft) => Vec3::new(-1.0, 0.0, -1.0),
        (ViewAxis::Side, Corner::BottomRight) => Vec3::new(1.0, 0.0, -1.0),
        (ViewAxis::Front, Corner::TopLeft) => Vec3::new(0.0, -1.0, 1.0),
        (ViewAxis::Front, Corner::TopRight) => Vec3::new(0.0, 1.0, 1.0),
        (ViewAxis::Front, Corner::BottomLeft) => Vec3::new(0.0, -1.0, -1.0),
        (ViewAxis::Front, Corner::BottomRight) => Vec3::new(0.0, 1.0, -1.0),
    }
}

/// Pointer delta between two plane hits, in the box frame, with the
/// component along the view axis removed.
fn in_plane_delta(view: ViewAxis, start: &CuboidPose, point_start: Vec3, point_end: Vec3) -> Vec3 {
    let mut delta = start.rotation_quat().inverse() * (point_end - point_start);
    delta[view.normal_index()] = 0.0;
    delta
}

/// Moves the box with the pointer inside the view plane. Also returns the
/// box-frame offset the camera must take back so it stays put in the world.
pub fn translate(
    view: ViewAxis,
    start: &CuboidPose,
    point_start: Vec3,
    point_end: Vec3,
) -> (CuboidPose, Vec2) {
    let delta = in_plane_delta(view, start, point_start, point_end);
    let pose = CuboidPose {
        position: start.position + start.rotation_quat() * delta,
        ..*start
    };
    (pose, view.in_plane(delta))
}

/// Turns the box about the view axis by the angle the pointer swept around
/// its centre. `None` when either lever is too short to define an angle.
pub fn rotate(axis: Vec3, start: &CuboidPose, point_start: Vec3, point_end: Vec3) -> Option<CuboidPose> {
    let axis = axis.try_normalize()?;
    let a = point_start - axis * point_start.dot(axis);
    let b = point_end - axis * point_end.dot(axis);
    if a.length() < LEVER_EPSILON || b.length() < LEVER_EPSILON {
        return None;
    }

    let mut angle = a.angle_between(b);
    if a.cross(b).dot(axis) < 0.0 {
        angle = -angle;
    }
    if !angle.is_finite() {
        return None;
    }

    let rotation = Quat::from_axis_angle(axis, angle) * start.rotation_quat();
    let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
    Some(CuboidPose {
        rotation: Vec3::new(x, y, z),
        ..*start
    })
}

/// Resizes the box from `corner` while the opposite corner stays fixed.
/// Extents never drop below `MIN_EXTENT`. Also returns the box-frame offset
/// the camera must take back so it stays put in the world.
pub fn scale(
    view: ViewAxis,
    corner: Corner,
    start: &CuboidPose,
    point_start: Vec3,
    point_end: Vec3,
) -> (CuboidPose, Vec2) {
    let signs = corner_signs(view, corner);
    let delta = in_plane_delta(view, start, point_start, point_end);

    let mut new_scale = start.scale + delta * signs;
    let (u, v) = view.in_plane_indices();
    for axis in [u, v] {
        new_scale[axis] = new_scale[axis].max(MIN_EXTENT);
    }

    let shift = (start.scale - new_scale) * 0.5 * -signs;
    let pose = CuboidPose {
        position: start.position + start.rotation_quat() * shift,
        scale: new_scale,
        ..*start
    };
    (pose, view.in_plane(shift))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn start() -> CuboidPose {
        CuboidPose::new(
            Vec3::new(3.0, -1.0, 0.5),
            Vec3::new(0.2, -0.1, 0.7),
            Vec3::new(2.0, 1.0, 1.5),
        )
    }

    fn unit_corner(view: ViewAxis, corner: Corner) -> Vec3 {
        let s = corner.screen_signs();
        view.right() * s.x * 0.5 + view.up() * s.y * 0.5
    }

    #[test]
    fn sign_table_matches_screen_axes() {
        for view in ViewAxis::ALL {
            for corner in Corner::ALL {
                let s = corner.screen_signs();
                let expected = view.right() * s.x + view.up() * s.y;
                assert_eq!(corner_signs(view, corner), expected);
                assert_eq!(corner_signs(view, corner)[view.normal_index()], 0.0);
            }
        }
    }

    #[test]
    fn scale_keeps_opposite_corner_fixed() {
        let start = start();
        for view in ViewAxis::ALL {
            for corner in Corner::ALL {
                let opposite = -unit_corner(view, corner);
                let fixed = start.local_to_parent(opposite);
                let grab = start.local_to_parent(unit_corner(view, corner));
                let drag = start.rotation_quat()
                    * (view.right() * 0.3 - view.up() * 0.2 + view.eye() * 0.4);

                let (pose, _) = scale(view, corner, &start, grab - start.position, grab + drag - start.position);
                assert!(
                    pose.local_to_parent(opposite).abs_diff_eq(fixed, 1e-5),
                    "{view} {corner:?}"
                );
                assert_relative_eq!(
                    pose.scale[view.normal_index()],
                    start.scale[view.normal_index()]
                );
            }
        }
    }

    #[test]
    fn scale_is_clamped_to_min_extent() {
        let start = start();
        let view = ViewAxis::Top;
        let grab = start.local_to_parent(unit_corner(view, Corner::TopRight));
        let far_past = grab - start.rotation_quat() * Vec3::new(10.0, 10.0, 0.0);

        let (pose, _) = scale(view, Corner::TopRight, &start, grab - start.position, far_past - start.position);
        assert_relative_eq!(pose.scale.x, MIN_EXTENT);
        assert_relative_eq!(pose.scale.y, MIN_EXTENT);
        let fixed = start.local_to_parent(-unit_corner(view, Corner::TopRight));
        assert!(pose.local_to_parent(-unit_corner(view, Corner::TopRight)).abs_diff_eq(fixed, 1e-5));
    }

    #[test]
    fn translate_ignores_motion_along_view_axis() {
        let start = start();
        for view in ViewAxis::ALL {
            let delta = start.rotation_quat() * (view.right() * 0.5 + view.eye() * 2.0);
            let (pose, camera_offset) = translate(view, &start, Vec3::ZERO, delta);

            let local_move = start.rotation_quat().inverse() * (pose.position - start.position);
            assert_relative_eq!(local_move[view.normal_index()], 0.0, epsilon = 1e-5);
            assert!(camera_offset.abs_diff_eq(Vec2::new(0.5, 0.0), 1e-5));
            assert_eq!(pose.rotation, start.rotation);
            assert_eq!(pose.scale, start.scale);
        }
    }

    #[test]
    fn rotate_turns_about_view_axis_only() {
        let start = CuboidPose::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.3), Vec3::ONE);
        let pose = rotate(Vec3::NEG_Z, &start, Vec3::new(0.0, 1.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)).unwrap();

        // a quarter turn counter-clockwise seen from above
        assert_relative_eq!(pose.rotation.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(pose.rotation.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(pose.rotation.z, 0.3 + std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn rotate_from_centre_is_ignored() {
        let start = start();
        assert!(rotate(Vec3::X, &start, Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)).is_none());
    }
}
