//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, state transitions,
//! and plugin initialisation for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with viewport, scroll, input and RPC plugins and
/// the platform-specific asset root.
pub mod app_setup;

/// Application state machine.
///
/// `Loading` until the model registry is resolved, then `Running`.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
///
/// Binds windows to page canvases on web targets and sets vsync.
pub mod window_config;
