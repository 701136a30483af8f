use bevy::prelude::*;
use thiserror::Error;

use crate::engine::cuboid::CuboidId;

/// Structural and value errors raised when reading or writing a cuboid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CuboidError {
    #[error("entity {0} is not a cuboid")]
    NotACuboid(Entity),

    #[error("cuboid '{0}' has no extent child to scale")]
    MissingExtent(CuboidId),

    #[error("cuboid '{id}' cannot take non-positive scale {scale}")]
    NonPositiveScale { id: CuboidId, scale: Vec3 },
}

/// Errors raised by a view camera when it is configured or attached.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("cannot attach view to an invalid cuboid: {0}")]
    InvalidTarget(#[from] CuboidError),

    #[error("view camera {0} must use an orthographic projection")]
    UnsupportedProjection(Entity),
}
