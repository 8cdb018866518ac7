//! Scroll-driven progress for the page sections.
//!
//! Raw offsets come from the page (RPC `scroll` notifications or the window
//! `scroll` event on wasm), are smoothed here, and every resolved offset is
//! mapped to per-section progress and forwarded to the bound viewports.

/// Section geometry and the progress/fade formulas.
pub mod section_progress;

/// Systems and plugin tying scroll ticks to viewports and page styles.
pub mod scroll_coordinator;

/// Time-based glide from the current offset to the latest target.
pub mod smooth_scroll;
