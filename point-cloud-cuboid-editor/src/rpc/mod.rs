//! JSON-RPC 2.0 bridge between the editor and a host annotation page.
//!
//! On the web the editor runs in an iframe and talks to its parent window
//! through `postMessage`. Native builds keep the same systems with a no-op
//! transport, so the request handlers stay testable.
//!
//! ## Message Flow
//!
//! ```text
//! Annotation page (parent)  <──postMessage──>  Editor (iframe)
//!        │                                        │
//!        ├─ select_cuboid { id } ───────────────> ├─ SelectCuboid
//!        │ <──────────────────────── response ────┤
//!        │                                        │
//!        │ <── cuboid_pose_changed { id, pose } ──┤ every drag step
//!        │ <── selection_changed { id } ──────────┤
//! ```
//!
//! ## Methods
//!
//! - `select_cuboid { id }`: attach every view to a cuboid
//! - `deselect`: detach every view
//! - `get_cuboid_pose { id }`: `[px, py, pz, rx, ry, rz, sx, sy, sz]`
//! - `list_cuboids`: ids of every cuboid in the scene
//! - `set_view_enabled { view, enabled }`: lock or unlock one view
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params (including unknown cuboid ids)

/// Request handling, notifications and the iframe transport.
pub mod web_rpc;
