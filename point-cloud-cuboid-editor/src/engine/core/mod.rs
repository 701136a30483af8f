//! Application setup for the interactive editor.
//!
//! Handles window configuration, the four-viewport camera layout and the
//! demo scene for both native and WASM targets.

/// App creation, camera rig and demo scene.
pub mod app_setup;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
