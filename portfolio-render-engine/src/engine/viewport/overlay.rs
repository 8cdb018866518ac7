use bevy::prelude::*;

use super::commands::ViewportContext;
use super::kind::ViewportKind;
use crate::engine::errors::ViewportError;

const MODAL_KEY: &str = "modal";
const ABOUT_KEY: &str = "about";

/// Which transient scenes are open.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct OverlayState {
    pub project: Option<String>,
    pub about_open: bool,
}

impl ViewportContext<'_, '_> {
    /// Show project `project` in the modal, replacing whatever it showed.
    pub fn open_project(&mut self, project: &str) -> Result<serde_json::Value, ViewportError> {
        let project = project.trim();
        if project.is_empty() {
            return Err(ViewportError::UnknownKey("project-".to_string()));
        }

        let released = self.close_overlay(MODAL_KEY);
        self.overlays.project = None;

        let opened = self.initialize(ViewportKind::Modal(project.to_string()))?;
        self.overlays.project = Some(project.to_string());
        info!("Opened project {} (replaced {} nodes)", project, released);

        Ok(serde_json::json!({
            "project": project,
            "models": opened["models"],
        }))
    }

    pub fn close_project(&mut self) -> Result<serde_json::Value, ViewportError> {
        let released = self.close_overlay(MODAL_KEY);
        let project = self.overlays.project.take();
        Ok(serde_json::json!({
            "closed": project,
            "nodes_released": released,
        }))
    }

    pub fn open_about(&mut self) -> Result<serde_json::Value, ViewportError> {
        self.close_overlay(ABOUT_KEY);
        self.overlays.about_open = false;

        let opened = self.initialize(ViewportKind::About)?;
        self.overlays.about_open = true;
        Ok(opened)
    }

    pub fn close_about(&mut self) -> Result<serde_json::Value, ViewportError> {
        let released = self.close_overlay(ABOUT_KEY);
        let was_open = std::mem::take(&mut self.overlays.about_open);
        Ok(serde_json::json!({
            "closed": was_open,
            "nodes_released": released,
        }))
    }

    /// Dispose the overlay under `key` if it exists. Closing twice is fine.
    fn close_overlay(&mut self, key: &str) -> usize {
        if self.registry.get(key).is_none() {
            return 0;
        }
        self.dispose(key).unwrap_or(0)
    }
}
