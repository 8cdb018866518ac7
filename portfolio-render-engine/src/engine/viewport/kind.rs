use super::profile::PresentationProfile;
use crate::engine::assets::model_descriptor::ModelDescriptor;
use crate::engine::assets::model_registry::ModelRegistry;
use constants::scroll::{GALLERY_SECTION, HERO_CANVAS};

/// Which page surface a viewport scene renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewportKind {
    Hero,
    Gallery,
    ProjectCard(String),
    Modal(String),
    About,
}

impl ViewportKind {
    /// Parse a viewport key as used by the page. The modal is opened per
    /// project and has no standalone key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "hero" => Some(Self::Hero),
            "gallery" => Some(Self::Gallery),
            "about" => Some(Self::About),
            _ => key
                .strip_prefix("project-")
                .filter(|id| !id.is_empty())
                .map(|id| Self::ProjectCard(id.to_string())),
        }
    }

    pub fn key(&self) -> String {
        match self {
            Self::Hero => "hero".to_string(),
            Self::Gallery => "gallery".to_string(),
            Self::ProjectCard(id) => format!("project-{id}"),
            Self::Modal(_) => "modal".to_string(),
            Self::About => "about".to_string(),
        }
    }

    pub fn canvas_selector(&self) -> String {
        match self {
            Self::Hero => HERO_CANVAS.to_string(),
            Self::Gallery => format!("{GALLERY_SECTION} .horizontal-canvas"),
            Self::ProjectCard(id) => format!(".project-card[data-project=\"{id}\"] .project-canvas"),
            Self::Modal(_) => "#modal-canvas".to_string(),
            Self::About => "#about-canvas".to_string(),
        }
    }

    pub fn profile(&self) -> PresentationProfile {
        match self {
            Self::Hero => PresentationProfile::HERO,
            Self::Gallery => PresentationProfile::GALLERY,
            Self::ProjectCard(_) => PresentationProfile::CARD,
            Self::Modal(_) => PresentationProfile::MODAL,
            Self::About => PresentationProfile::ABOUT,
        }
    }

    /// Overlays are transient and resized once the page has laid them out.
    pub fn is_overlay(&self) -> bool {
        matches!(self, Self::Modal(_) | Self::About)
    }

    /// Models this viewport shows, in slot order.
    pub fn select_models(&self, registry: &ModelRegistry) -> Vec<ModelDescriptor> {
        match self {
            Self::Hero | Self::About => vec![registry.hero().clone()],
            Self::Gallery => registry.gallery_order(),
            Self::ProjectCard(id) | Self::Modal(id) => registry.for_project(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_for_page_viewports() {
        for kind in [
            ViewportKind::Hero,
            ViewportKind::Gallery,
            ViewportKind::About,
            ViewportKind::ProjectCard("7".into()),
        ] {
            assert_eq!(ViewportKind::from_key(&kind.key()), Some(kind));
        }
        assert_eq!(ViewportKind::from_key("modal"), None);
        assert_eq!(ViewportKind::from_key("project-"), None);
    }

    #[test]
    fn project_canvas_selector_targets_the_card() {
        let kind = ViewportKind::ProjectCard("3".into());
        assert_eq!(
            kind.canvas_selector(),
            ".project-card[data-project=\"3\"] .project-canvas"
        );
        assert_eq!(kind.profile().name, "card");
    }

    #[test]
    fn model_selection_follows_the_kind() {
        let registry = ModelRegistry::builtin();

        assert_eq!(ViewportKind::Hero.select_models(&registry)[0].file, "tree.glb");
        assert_eq!(ViewportKind::Gallery.select_models(&registry).len(), 12);

        let modal = ViewportKind::Modal("7".into()).select_models(&registry);
        assert_eq!(modal.len(), 1);
        assert_eq!(modal[0].file, "dragon.glb");
    }
}
