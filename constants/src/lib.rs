pub mod coordinate_system;
pub mod framing;
pub mod gizmo;
