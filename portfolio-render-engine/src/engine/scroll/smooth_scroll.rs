use bevy::prelude::*;

use constants::scroll::{
    SMOOTH_SCROLL_DURATION, SMOOTH_SCROLL_EASE_BIAS, SMOOTH_SCROLL_EASE_STEEPNESS,
};

/// `min(1, 1.001 - 2^(-10t))`.
pub fn glide_ease(t: f32) -> f32 {
    (SMOOTH_SCROLL_EASE_BIAS - 2f32.powf(-SMOOTH_SCROLL_EASE_STEEPNESS * t)).min(1.0)
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettings {
    /// When false offsets pass straight through, for pages that already
    /// smooth their own scrolling.
    pub smoothing: bool,
    pub duration: f32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            smoothing: true,
            duration: SMOOTH_SCROLL_DURATION,
        }
    }
}

/// Eased glide toward the most recent raw scroll offset.
#[derive(Resource, Debug, Clone, Default)]
pub struct SmoothScroll {
    from: f32,
    target: f32,
    current: f32,
    elapsed: f32,
    animating: bool,
    /// A pass-through offset waiting to be reported.
    pending: bool,
}

impl SmoothScroll {
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Move to `offset` without gliding and report it on the next advance.
    pub fn jump_to(&mut self, offset: f32) {
        if !offset.is_finite() {
            return;
        }
        self.from = offset;
        self.target = offset;
        self.current = offset;
        self.animating = false;
        self.pending = true;
    }

    pub fn set_target(&mut self, offset: f32, settings: &ScrollSettings) {
        if !offset.is_finite() {
            return;
        }

        if !settings.smoothing || settings.duration <= 0.0 {
            self.jump_to(offset);
            return;
        }

        self.from = self.current;
        self.target = offset;
        self.elapsed = 0.0;
        self.animating = true;
    }

    /// Advance by `dt` seconds. Returns the resolved offset when it moved.
    pub fn advance(&mut self, dt: f32, settings: &ScrollSettings) -> Option<f32> {
        if self.pending {
            self.pending = false;
            return Some(self.current);
        }
        if !self.animating {
            return None;
        }

        self.elapsed += dt.max(0.0);
        let t = (self.elapsed / settings.duration).min(1.0);
        self.current = self.from + (self.target - self.from) * glide_ease(t);

        if t >= 1.0 {
            self.current = self.target;
            self.animating = false;
        }
        Some(self.current)
    }
}
