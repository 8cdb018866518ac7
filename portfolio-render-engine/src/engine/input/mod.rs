//! Pointer, touch and device orientation input.
//!
//! Browser callbacks never touch scene state directly. They push into
//! shared queues that systems drain once per frame, and the systems turn
//! the result into per-node rotation targets.

/// Gyroscope baseline tracking and tilt-to-rotation mapping.
pub mod gyro;

/// Active input mode, permission flow and the per-frame motion system.
pub mod input_manager;

/// Cursor tracking, hover state and exponential smoothing.
pub mod pointer;

/// One finger rotation with inertia and two finger pinch zoom.
pub mod touch;
