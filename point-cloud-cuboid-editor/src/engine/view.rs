use bevy::prelude::*;
use constants::coordinate_system::{
    FRONT_VIEW_BASIS, FRONT_VIEW_NORMAL_INDEX, SIDE_VIEW_BASIS, SIDE_VIEW_NORMAL_INDEX,
    TOP_VIEW_BASIS, TOP_VIEW_NORMAL_INDEX,
};
use serde::{Deserialize, Serialize};

/// One of the three orthographic editing views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewAxis {
    Top,
    Side,
    Front,
}

impl ViewAxis {
    pub const ALL: [ViewAxis; 3] = [ViewAxis::Top, ViewAxis::Side, ViewAxis::Front];

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "top" => Some(ViewAxis::Top),
            "side" => Some(ViewAxis::Side),
            "front" => Some(ViewAxis::Front),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewAxis::Top => "top",
            ViewAxis::Side => "side",
            ViewAxis::Front => "front",
        }
    }

    fn basis(self) -> [Vec3; 3] {
        match self {
            ViewAxis::Top => TOP_VIEW_BASIS,
            ViewAxis::Side => SIDE_VIEW_BASIS,
            ViewAxis::Front => FRONT_VIEW_BASIS,
        }
    }

    /// Direction from the box towards the camera.
    pub fn eye(self) -> Vec3 {
        self.basis()[0]
    }

    /// Screen right, in the box frame.
    pub fn right(self) -> Vec3 {
        self.basis()[1]
    }

    /// Screen up, in the box frame.
    pub fn up(self) -> Vec3 {
        self.basis()[2]
    }

    /// Component index of the axis this view looks along.
    pub fn normal_index(self) -> usize {
        match self {
            ViewAxis::Top => TOP_VIEW_NORMAL_INDEX,
            ViewAxis::Side => SIDE_VIEW_NORMAL_INDEX,
            ViewAxis::Front => FRONT_VIEW_NORMAL_INDEX,
        }
    }

    /// Component indices of the screen right and screen up axes.
    pub fn in_plane_indices(self) -> (usize, usize) {
        match self {
            ViewAxis::Top => (0, 1),
            ViewAxis::Side => (0, 2),
            ViewAxis::Front => (1, 2),
        }
    }

    /// Camera orientation looking back along `eye`, with `right`/`up` on screen.
    pub fn camera_rotation(self) -> Quat {
        Quat::from_mat3(&Mat3::from_cols(self.right(), self.up(), self.eye()))
    }

    /// Projects a box-frame vector onto the screen plane.
    pub fn in_plane(self, v: Vec3) -> Vec2 {
        Vec2::new(v.dot(self.right()), v.dot(self.up()))
    }

    pub fn from_in_plane(self, p: Vec2) -> Vec3 {
        self.right() * p.x + self.up() * p.y
    }

    /// Box extent along screen right and screen up.
    pub fn in_plane_extent(self, scale: Vec3) -> Vec2 {
        let (u, v) = self.in_plane_indices();
        Vec2::new(scale[u], scale[v])
    }

    /// Box extent along the view direction.
    pub fn depth_extent(self, scale: Vec3) -> f32 {
        scale[self.normal_index()]
    }
}

impl std::fmt::Display for ViewAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bases_are_right_handed_and_match_indices() {
        for view in ViewAxis::ALL {
            assert!(view.right().cross(view.up()).abs_diff_eq(view.eye(), 1e-6));
            assert_eq!(view.eye().abs()[view.normal_index()], 1.0);
            let (u, v) = view.in_plane_indices();
            assert_eq!(view.right()[u], 1.0);
            assert_eq!(view.up()[v], 1.0);
        }
    }

    #[test]
    fn camera_rotation_looks_along_negative_eye() {
        for view in ViewAxis::ALL {
            let rotation = view.camera_rotation();
            assert!((rotation * Vec3::NEG_Z).abs_diff_eq(-view.eye(), 1e-6));
            assert!((rotation * Vec3::X).abs_diff_eq(view.right(), 1e-6));
            assert!((rotation * Vec3::Y).abs_diff_eq(view.up(), 1e-6));
        }
    }

    #[test]
    fn names_round_trip() {
        for view in ViewAxis::ALL {
            assert_eq!(ViewAxis::from_string(view.as_str()), Some(view));
        }
        assert_eq!(ViewAxis::from_string("perspective"), None);
    }
}
