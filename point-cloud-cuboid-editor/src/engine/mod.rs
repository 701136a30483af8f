/// Orthographic view cameras, framing helpers and the free orbit view.
pub mod camera;

/// Application setup, window configuration and demo scene.
pub mod core;

/// Scene representation of a cuboid and the pose adapter over it.
pub mod cuboid;

/// Error types shared by the cuboid and camera layers.
pub mod error;

/// The three orthographic view directions and their axis tables.
pub mod view;
