//! Shared tuning values for the portfolio render engine.
//!
//! Everything in here is plain data so it can be tweaked without touching
//! the systems that consume it.

/// Built-in model catalogue used when no registry manifest is deployed.
pub mod catalogue;

/// Scroll-bound gallery animation tuning.
pub mod gallery;

/// Pointer, touch and device orientation tuning.
pub mod input;

/// Log filter used by the engine's `LogPlugin`.
pub mod logging;

/// Deployment and asset path layout.
pub mod paths;

/// Camera, light rig and surface settings per presentation profile.
pub mod render_settings;

/// Smooth scroll and landing section tuning.
pub mod scroll;
