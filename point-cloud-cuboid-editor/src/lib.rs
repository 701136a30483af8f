//! Multi-view cuboid editing for point-cloud annotation.
//!
//! Three orthographic views (top, side, front) frame the selected cuboid and
//! let the user translate, rotate and resize it with on-screen handles. The
//! crate is split the same way the editor runs:
//!
//! - [`engine`] owns the scene representation of a cuboid, the orthographic
//!   view cameras and the demo application setup.
//! - [`tools`] owns the handle gizmo, pointer interaction and selection.
//! - [`rpc`] bridges the editor to a host page over JSON-RPC.

pub mod engine;
pub mod rpc;
pub mod tools;
