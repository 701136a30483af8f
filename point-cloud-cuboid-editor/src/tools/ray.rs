use bevy::prelude::*;

/// Ray parameter at which `ray` enters the oriented box `transform` maps the
/// unit cube onto, or `None` when it misses. Degenerate boxes never hit.
pub fn ray_hits_obb(ray: &Ray3d, transform: &Transform) -> Option<f32> {
    let inv = transform.compute_matrix().inverse();
    if !inv.is_finite() {
        return None;
    }
    let origin = inv.transform_point3(ray.origin);
    let direction = inv.transform_vector3(*ray.direction);
    ray_aabb_hit_t(origin, direction, Vec3::splat(-0.5), Vec3::splat(0.5))
}

/// Slab test against an axis-aligned box. Returns the entry parameter, or the
/// exit parameter when the origin is inside.
pub fn ray_aabb_hit_t(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        if direction[axis].abs() < f32::EPSILON {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / direction[axis];
        let mut t0 = (min[axis] - origin[axis]) * inv;
        let mut t1 = (max[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if !t_far.is_finite() || t_far < 0.0 {
        return None;
    }
    Some(if t_near >= 0.0 { t_near } else { t_far })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hits_scaled_box_from_outside() {
        let ray = Ray3d::new(Vec3::new(0.0, 0.0, 10.0), Dir3::NEG_Z);
        let transform = Transform::from_scale(Vec3::new(2.0, 2.0, 4.0));
        assert_relative_eq!(ray_hits_obb(&ray, &transform).unwrap(), 8.0, epsilon = 1e-5);
    }

    #[test]
    fn misses_offset_box() {
        let ray = Ray3d::new(Vec3::new(0.0, 0.0, 10.0), Dir3::NEG_Z);
        let transform = Transform::from_xyz(3.0, 0.0, 0.0);
        assert!(ray_hits_obb(&ray, &transform).is_none());
    }

    #[test]
    fn rotated_box_is_tested_in_its_own_frame() {
        let ray = Ray3d::new(Vec3::new(0.6, 0.6, 10.0), Dir3::NEG_Z);
        let transform = Transform::from_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_4))
            .with_scale(Vec3::new(2.0, 0.1, 1.0));
        assert!(ray_hits_obb(&ray, &transform).is_some());
        let flat = Transform::from_scale(Vec3::new(0.1, 2.0, 1.0));
        assert!(ray_hits_obb(&ray, &flat).is_none());
    }

    #[test]
    fn degenerate_box_never_hits() {
        let ray = Ray3d::new(Vec3::new(0.0, 0.0, 10.0), Dir3::NEG_Z);
        let transform = Transform::from_scale(Vec3::new(0.0, 1.0, 1.0));
        assert!(ray_hits_obb(&ray, &transform).is_none());
    }

    #[test]
    fn inside_origin_returns_exit() {
        let t = ray_aabb_hit_t(Vec3::ZERO, Vec3::X, Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_relative_eq!(t.unwrap(), 1.0);
    }
}
