use bevy::prelude::*;

use crate::web::dom::SectionMetrics;
use constants::scroll::{
    HERO_CONTENT_FADE_RATE, HERO_FADE_SPAN, HERO_INDICATOR_FADE_RATE, HERO_SCALE_GAIN,
};

/// Progress through a pinned section: 0 at its top, 1 once its last
/// viewport-height has scrolled into view. Sections no taller than the
/// viewport jump from 0 to 1 at their start.
pub fn section_progress(scroll: f32, section: SectionMetrics, viewport_height: f32) -> f32 {
    let scrollable = section.height - viewport_height;
    if scrollable <= 0.0 {
        return if scroll < section.top { 0.0 } else { 1.0 };
    }
    ((scroll - section.top) / scrollable).clamp(0.0, 1.0)
}

/// Landing section styling for one scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroEffects {
    pub progress: f32,
    /// Canvas and headline opacity.
    pub content_opacity: f32,
    pub indicator_opacity: f32,
    pub scale: f32,
}

pub fn hero_effects(scroll: f32, hero_height: f32) -> HeroEffects {
    let span = hero_height * HERO_FADE_SPAN;
    let progress = if span > 0.0 {
        (scroll / span).clamp(0.0, 1.0)
    } else if scroll > 0.0 {
        1.0
    } else {
        0.0
    };

    HeroEffects {
        progress,
        content_opacity: (1.0 - progress * HERO_CONTENT_FADE_RATE).max(0.0),
        indicator_opacity: (1.0 - progress * HERO_INDICATOR_FADE_RATE).max(0.0),
        scale: 1.0 + progress * HERO_SCALE_GAIN,
    }
}

/// Geometry of the tracked sections. Missing sections are skipped.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SectionLayout {
    pub hero: Option<SectionMetrics>,
    pub gallery: Option<SectionMetrics>,
    pub viewport_height: f32,
}

/// Everything derived from one resolved scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    pub offset: f32,
    pub hero: Option<HeroEffects>,
    pub gallery: Option<f32>,
}

pub fn resolve_frame(offset: f32, layout: &SectionLayout) -> ScrollFrame {
    ScrollFrame {
        offset,
        hero: layout.hero.map(|hero| hero_effects(offset, hero.height)),
        gallery: layout
            .gallery
            .map(|gallery| section_progress(offset, gallery, layout.viewport_height)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(top: f32, height: f32) -> SectionMetrics {
        SectionMetrics { top, height }
    }

    #[test]
    fn halfway_through_a_two_screen_section() {
        let progress = section_progress(250.0, section(0.0, 1000.0), 500.0);
        assert!((progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn progress_is_clamped_outside_the_section() {
        let gallery = section(1000.0, 3000.0);
        assert_eq!(section_progress(0.0, gallery, 800.0), 0.0);
        assert_eq!(section_progress(99_999.0, gallery, 800.0), 1.0);
        assert_eq!(section_progress(-50.0, gallery, 800.0), 0.0);
    }

    #[test]
    fn short_sections_switch_at_their_start() {
        let short = section(400.0, 300.0);
        assert_eq!(section_progress(399.0, short, 800.0), 0.0);
        assert_eq!(section_progress(400.0, short, 800.0), 1.0);
    }

    #[test]
    fn landing_section_fades_and_grows() {
        let start = hero_effects(0.0, 1000.0);
        assert_eq!(start.content_opacity, 1.0);
        assert_eq!(start.indicator_opacity, 1.0);
        assert_eq!(start.scale, 1.0);

        // 200 / (1000 * 0.8) = 0.25
        let early = hero_effects(200.0, 1000.0);
        assert!((early.progress - 0.25).abs() < 1e-6);
        assert!((early.content_opacity - 0.625).abs() < 1e-6);
        assert!((early.indicator_opacity - 0.25).abs() < 1e-6);
        assert!((early.scale - 1.025).abs() < 1e-6);

        let late = hero_effects(5000.0, 1000.0);
        assert_eq!(late.content_opacity, 0.0);
        assert_eq!(late.indicator_opacity, 0.0);
        assert!((late.scale - 1.1).abs() < 1e-6);
    }

    #[test]
    fn same_offset_resolves_identically() {
        let layout = SectionLayout {
            hero: Some(section(0.0, 900.0)),
            gallery: Some(section(1800.0, 4000.0)),
            viewport_height: 900.0,
        };
        assert_eq!(resolve_frame(2500.0, &layout), resolve_frame(2500.0, &layout));
    }

    #[test]
    fn missing_sections_are_skipped() {
        let frame = resolve_frame(100.0, &SectionLayout::default());
        assert!(frame.hero.is_none());
        assert!(frame.gallery.is_none());
    }
}
