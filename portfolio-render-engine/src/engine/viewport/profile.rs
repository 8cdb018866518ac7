use bevy::prelude::*;

use constants::render_settings::{
    ABOUT_CAMERA, CARD_CAMERA, CARD_LIGHTS, CARD_POINTER_GAIN, CARD_SMOOTHING, CameraSettings,
    GALLERY_LIGHTS, HERO_CAMERA, HERO_IDLE_SPIN, HERO_LIGHTS, HERO_POINTER_GAIN, HERO_SMOOTHING,
    LightRig, MODAL_POINTER_GAIN, MODAL_SCALE_MULTIPLIER, MODAL_SMOOTHING,
    MODAL_UNGROUPED_NUDGE_X,
};

/// When the pointer drives model rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTracking {
    Disabled,
    /// Only while the pointer is over this viewport's canvas.
    WhileHovered,
    /// Pointer position over any canvas on the page.
    Anywhere,
}

/// Per-scene tuning. One scene type covers every section; the profile is
/// what makes a card, the modal or the landing tree behave differently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentationProfile {
    pub name: &'static str,
    pub scale_multiplier: f32,
    pub tracking: PointerTracking,
    /// Rotation at the canvas edge, `x` for horizontal pointer travel.
    pub pointer_gain: Vec2,
    pub smoothing: f32,
    /// Radians added around Y every frame.
    pub idle_spin: f32,
    pub camera: CameraSettings,
    pub lights: LightRig,
    /// Extra x offset for models without a group key.
    pub ungrouped_nudge_x: f32,
    /// Node placement follows the scroll progress.
    pub scroll_bound: bool,
    /// Touch gestures and device orientation apply to this scene.
    pub handheld: bool,
}

impl PresentationProfile {
    pub const CARD: Self = Self {
        name: "card",
        scale_multiplier: 1.0,
        tracking: PointerTracking::WhileHovered,
        pointer_gain: CARD_POINTER_GAIN,
        smoothing: CARD_SMOOTHING,
        idle_spin: 0.0,
        camera: CARD_CAMERA,
        lights: CARD_LIGHTS,
        ungrouped_nudge_x: 0.0,
        scroll_bound: false,
        handheld: true,
    };

    pub const MODAL: Self = Self {
        name: "modal",
        scale_multiplier: MODAL_SCALE_MULTIPLIER,
        pointer_gain: MODAL_POINTER_GAIN,
        smoothing: MODAL_SMOOTHING,
        ungrouped_nudge_x: MODAL_UNGROUPED_NUDGE_X,
        ..Self::CARD
    };

    pub const GALLERY: Self = Self {
        name: "gallery",
        tracking: PointerTracking::Disabled,
        lights: GALLERY_LIGHTS,
        scroll_bound: true,
        handheld: false,
        ..Self::CARD
    };

    pub const HERO: Self = Self {
        name: "hero",
        scale_multiplier: 1.0,
        tracking: PointerTracking::Anywhere,
        pointer_gain: HERO_POINTER_GAIN,
        smoothing: HERO_SMOOTHING,
        idle_spin: HERO_IDLE_SPIN,
        camera: HERO_CAMERA,
        lights: HERO_LIGHTS,
        ungrouped_nudge_x: 0.0,
        scroll_bound: false,
        handheld: false,
    };

    pub const ABOUT: Self = Self {
        name: "about",
        camera: ABOUT_CAMERA,
        ..Self::HERO
    };

    /// Pointer-driven rotation offset for a normalised pointer (y up).
    /// Horizontal travel turns the model around Y, vertical around X.
    pub fn pointer_offset(&self, pointer: Vec2) -> Vec2 {
        Vec2::new(pointer.y * self.pointer_gain.y, pointer.x * self.pointer_gain.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_amplifies_card_response() {
        let card = PresentationProfile::CARD;
        let modal = PresentationProfile::MODAL;

        assert_eq!(modal.scale_multiplier, 1.3);
        assert!(modal.pointer_gain.x > card.pointer_gain.x);
        assert!(modal.smoothing < card.smoothing);
        assert_eq!(modal.ungrouped_nudge_x, 1.0);
        assert_eq!(modal.tracking, PointerTracking::WhileHovered);
    }

    #[test]
    fn smoothing_factors_are_fractions() {
        for profile in [
            PresentationProfile::CARD,
            PresentationProfile::MODAL,
            PresentationProfile::GALLERY,
            PresentationProfile::HERO,
            PresentationProfile::ABOUT,
        ] {
            assert!(profile.smoothing > 0.0 && profile.smoothing < 1.0, "{}", profile.name);
        }
    }

    #[test]
    fn pointer_offset_maps_axes_crosswise() {
        let offset = PresentationProfile::HERO.pointer_offset(Vec2::new(1.0, -1.0));
        assert!((offset.y - 0.1).abs() < 1e-6);
        assert!((offset.x + 0.05).abs() < 1e-6);
    }

    #[test]
    fn about_is_hero_further_away() {
        assert_eq!(PresentationProfile::ABOUT.camera.distance, 20.0);
        assert_eq!(PresentationProfile::ABOUT.tracking, PointerTracking::Anywhere);
    }
}
