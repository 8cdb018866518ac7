//! Runtime diagnostics.
//!
//! Reports frame rate and live viewport counts to the page, and to the log
//! on native builds.

/// FPS tracking and notification systems for performance monitoring.
///
/// Sends frame rate updates to the page via RPC and logs them natively.
pub mod fps_tracking;
