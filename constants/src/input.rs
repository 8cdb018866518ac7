use bevy::math::Vec2;

/// Per-frame velocity retained after a one finger drag is released.
pub const TOUCH_INERTIA_DECAY: f32 = 0.92;

/// Per-frame decay of the drag delta while a finger is held down.
pub const TOUCH_HELD_DECAY: f32 = 0.8;

/// Inertia stops once both velocity components drop below this (pixels/frame).
pub const TOUCH_VELOCITY_THRESHOLD: f32 = 0.1;

/// Inertial rotation is applied at this fraction of the normalised velocity.
pub const TOUCH_INERTIA_GAIN: f32 = 0.5;

/// Pinch zoom camera distance limits.
pub const PINCH_MIN_DISTANCE: f32 = 2.0;
pub const PINCH_MAX_DISTANCE: f32 = 10.0;

/// Device orientation gains in radians of rotation per radian of tilt.
/// `x` scales the gamma (left/right) tilt onto the Y axis, `y` the beta
/// (front/back) tilt onto the X axis.
pub const GYRO_GAIN: Vec2 = Vec2::new(2.0, 0.5);

/// Smoothing factor while the gyroscope drives rotation.
pub const GYRO_SMOOTHING: f32 = 0.1;
