use bevy::prelude::*;

use constants::input::GYRO_GAIN;

/// One `deviceorientation` sample, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrientationReading {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

/// Fold a heading difference into [-180, 180].
pub fn wrap_degrees(delta: f32) -> f32 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Device tilt relative to a baseline taken from the first reading.
#[derive(Debug, Clone, Default)]
pub struct GyroController {
    active: bool,
    latest: OrientationReading,
    baseline: Option<OrientationReading>,
}

impl GyroController {
    pub fn enable(&mut self) {
        self.active = true;
    }

    /// Stops tracking and forgets the baseline.
    pub fn disable(&mut self) {
        self.active = false;
        self.baseline = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn on_reading(&mut self, reading: OrientationReading) {
        if !self.active {
            return;
        }
        self.latest = reading;
        if self.baseline.is_none() {
            self.calibrate();
        }
    }

    /// Treat the current orientation as neutral.
    pub fn calibrate(&mut self) {
        self.baseline = Some(self.latest);
    }

    /// Orientation relative to the baseline, heading wrapped.
    pub fn relative(&self) -> Option<OrientationReading> {
        if !self.active {
            return None;
        }
        let baseline = self.baseline?;
        Some(OrientationReading {
            alpha: wrap_degrees(self.latest.alpha - baseline.alpha),
            beta: self.latest.beta - baseline.beta,
            gamma: self.latest.gamma - baseline.gamma,
        })
    }

    /// Rotation offset from the base orientation: front/back tilt turns
    /// the model around X, left/right tilt around Y.
    pub fn rotation_offset(&self) -> Option<Vec2> {
        let relative = self.relative()?;
        Some(Vec2::new(
            relative.beta.to_radians() * GYRO_GAIN.y,
            relative.gamma.to_radians() * GYRO_GAIN.x,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(alpha: f32, beta: f32, gamma: f32) -> OrientationReading {
        OrientationReading { alpha, beta, gamma }
    }

    #[test]
    fn heading_wraps_across_north() {
        assert_eq!(wrap_degrees(350.0), -10.0);
        assert_eq!(wrap_degrees(-350.0), 10.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-45.0), -45.0);
    }

    #[test]
    fn first_reading_becomes_the_baseline() {
        let mut gyro = GyroController::default();
        gyro.enable();
        gyro.on_reading(reading(10.0, 40.0, -5.0));

        assert!(gyro.is_calibrated());
        assert_eq!(gyro.rotation_offset(), Some(Vec2::ZERO));

        gyro.on_reading(reading(355.0, 50.0, 25.0));
        let relative = gyro.relative().unwrap();
        assert_eq!(relative.alpha, -15.0);

        let offset = gyro.rotation_offset().unwrap();
        assert!((offset.x - 10f32.to_radians() * 0.5).abs() < 1e-6);
        assert!((offset.y - 30f32.to_radians() * 2.0).abs() < 1e-6);
    }

    #[test]
    fn recalibration_zeroes_the_offset() {
        let mut gyro = GyroController::default();
        gyro.enable();
        gyro.on_reading(reading(0.0, 0.0, 0.0));
        gyro.on_reading(reading(0.0, 20.0, 20.0));
        assert_ne!(gyro.rotation_offset(), Some(Vec2::ZERO));

        gyro.calibrate();
        assert_eq!(gyro.rotation_offset(), Some(Vec2::ZERO));
    }

    #[test]
    fn inactive_controller_ignores_readings() {
        let mut gyro = GyroController::default();
        gyro.on_reading(reading(1.0, 2.0, 3.0));
        assert!(!gyro.is_calibrated());
        assert_eq!(gyro.rotation_offset(), None);

        gyro.enable();
        gyro.on_reading(reading(1.0, 2.0, 3.0));
        gyro.disable();
        assert!(!gyro.is_calibrated());
        assert_eq!(gyro.relative(), None);
    }
}
