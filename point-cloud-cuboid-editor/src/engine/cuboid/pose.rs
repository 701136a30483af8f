use bevy::prelude::*;

/// Position, XYZ Euler rotation (radians) and extent of a cuboid.
///
/// The flat form `[px, py, pz, rx, ry, rz, sx, sy, sz]` is what the
/// annotation store and host page exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CuboidPose {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for CuboidPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl CuboidPose {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_array(values: [f32; 9]) -> Self {
        Self {
            position: Vec3::new(values[0], values[1], values[2]),
            rotation: Vec3::new(values[3], values[4], values[5]),
            scale: Vec3::new(values[6], values[7], values[8]),
        }
    }

    pub fn to_array(&self) -> [f32; 9] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
        ]
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Transform of the cuboid root: position and rotation, unit scale.
    pub fn root_transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation_quat(),
            scale: Vec3::ONE,
        }
    }

    /// Transform of the extent child, relative to the root.
    pub fn extent_transform(&self) -> Transform {
        Transform::from_scale(self.scale)
    }

    /// Rebuilds a pose from the root and extent transforms.
    ///
    /// `euler_hint` is the Euler triple last written to the cuboid. It is
    /// returned as-is when it still describes the root rotation, so a pose
    /// written and read back keeps its exact angles.
    pub fn from_transforms(root: &Transform, extent: &Transform, euler_hint: Option<Vec3>) -> Self {
        let rotation = match euler_hint {
            Some(hint) if hint.is_finite() && rotation_matches(hint, root.rotation) => hint,
            _ => {
                let (x, y, z) = root.rotation.to_euler(EulerRot::XYZ);
                Vec3::new(x, y, z)
            }
        };

        Self {
            position: root.translation,
            rotation,
            scale: extent.scale,
        }
        .sanitized()
    }

    /// Replaces non-finite components: position and rotation with 0, scale with 1.
    pub fn sanitized(&self) -> Self {
        Self {
            position: finite_or(self.position, 0.0),
            rotation: finite_or(self.rotation, 0.0),
            scale: finite_or(self.scale, 1.0),
        }
    }

    /// Replaces non-finite components with the matching component of `prior`.
    pub fn merged_onto(&self, prior: &CuboidPose) -> Self {
        Self {
            position: finite_or_prior(self.position, prior.position),
            rotation: finite_or_prior(self.rotation, prior.rotation),
            scale: finite_or_prior(self.scale, prior.scale),
        }
    }

    pub fn has_positive_scale(&self) -> bool {
        self.scale.cmpgt(Vec3::ZERO).all()
    }

    /// Maps a point given in unit-box coordinates (each axis in [-0.5, 0.5])
    /// to the cuboid's parent space.
    pub fn local_to_parent(&self, unit: Vec3) -> Vec3 {
        self.position + self.rotation_quat() * (unit * self.scale)
    }
}

fn rotation_matches(euler: Vec3, rotation: Quat) -> bool {
    Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z).angle_between(rotation) < 1e-4
}

fn finite_or(v: Vec3, fallback: f32) -> Vec3 {
    finite_or_prior(v, Vec3::splat(fallback))
}

fn finite_or_prior(v: Vec3, prior: Vec3) -> Vec3 {
    let pick = |value: f32, other: f32| if value.is_finite() { value } else { other };
    Vec3::new(pick(v.x, prior.x), pick(v.y, prior.y), pick(v.z, prior.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_form_keeps_component_order() {
        let values = [1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 4.0, 5.0, 6.0];
        let pose = CuboidPose::from_array(values);
        assert_eq!(pose.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(pose.rotation, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(pose.scale, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(pose.to_array(), values);
    }

    #[test]
    fn sanitized_coerces_non_finite_values() {
        let pose = CuboidPose::new(
            Vec3::new(f32::NAN, 1.0, 2.0),
            Vec3::new(0.5, f32::INFINITY, 0.0),
            Vec3::new(2.0, 3.0, f32::NEG_INFINITY),
        )
        .sanitized();
        assert_eq!(pose.position, Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(pose.rotation, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(pose.scale, Vec3::new(2.0, 3.0, 1.0));
    }

    #[test]
    fn merged_onto_keeps_prior_for_non_finite() {
        let prior = CuboidPose::new(Vec3::ONE, Vec3::ZERO, Vec3::splat(2.0));
        let update = CuboidPose::new(
            Vec3::new(5.0, f32::NAN, 5.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(f32::NAN, 3.0, 3.0),
        );
        let merged = update.merged_onto(&prior);
        assert_eq!(merged.position, Vec3::new(5.0, 1.0, 5.0));
        assert_eq!(merged.scale, Vec3::new(2.0, 3.0, 3.0));
    }

    #[test]
    fn euler_hint_survives_when_consistent() {
        let pose = CuboidPose::new(Vec3::ZERO, Vec3::new(0.3, -1.2, 2.9), Vec3::ONE);
        let root = pose.root_transform();
        let extent = pose.extent_transform();
        let read = CuboidPose::from_transforms(&root, &extent, Some(pose.rotation));
        assert_eq!(read.rotation, pose.rotation);

        let stale = CuboidPose::from_transforms(&root, &extent, Some(Vec3::ZERO));
        assert!(stale.rotation_quat().angle_between(root.rotation) < 1e-4);
    }

    #[test]
    fn local_to_parent_maps_corners() {
        let pose = CuboidPose::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
            Vec3::new(2.0, 1.0, 1.0),
        );
        let corner = pose.local_to_parent(Vec3::new(0.5, 0.5, 0.5));
        assert!(corner.abs_diff_eq(Vec3::new(0.5, 1.0, 0.5), 1e-5));
    }
}
