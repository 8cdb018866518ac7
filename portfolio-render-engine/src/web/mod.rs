//! Browser page access.
//!
//! Thin wrappers over `web-sys` for the handful of DOM reads and writes the
//! engine needs. Native builds get inert fallbacks so the systems calling
//! them stay target independent.

/// Element lookup, section geometry, style writes and event dispatch.
pub mod dom;
