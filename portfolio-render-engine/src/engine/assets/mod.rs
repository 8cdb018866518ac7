//! Model catalogue data and the geometry helpers used to place models.
//!
//! Descriptors are immutable once the registry is resolved; everything
//! live about a loaded model lives on its node entity instead.

/// Deployment base detection and asset root resolution.
pub mod base_url;

/// Axis-aligned bounds accumulated from mesh vertex positions.
pub mod bounds;

/// Static description of one loadable model and its placement.
pub mod model_descriptor;

/// Ordered model catalogue and per-viewport model selection.
pub mod model_registry;
