//! Model and registry loading.
//!
//! The registry manifest is resolved once while the app is `Loading`. Model
//! loads are started per viewport and finish asynchronously: a pending node
//! waits for its glTF, spawns the scene under a pivot, is finalised when the
//! scene instance is ready and only then attached to its viewport.

/// Per-viewport tally of settled model loads and the summary sent to the page.
pub mod load_batch;

/// glTF fetch polling, scene finalisation and late-arrival handling.
pub mod model_loader;

/// Registry manifest loading with fallback to the built-in catalogue.
pub mod registry_loader;
