use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model_descriptor::ModelDescriptor;
use constants::catalogue::{HERO_MODEL, MODEL_CATALOGUE};
use constants::render_settings::HERO_FIT_EXTENT;

/// Optional `models/registry.json` overriding the built-in catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, Asset, TypePath)]
pub struct RegistryManifest {
    pub models: Vec<ModelDescriptor>,
    #[serde(default)]
    pub hero: Option<ModelDescriptor>,
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("registry manifest lists no models")]
    Empty,
    #[error("model entry {index} has no file name")]
    MissingFile { index: usize },
    #[error("model file '{0}' is listed more than once")]
    DuplicateFile(String),
}

/// Ordered, immutable model catalogue for the whole page.
#[derive(Resource, Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    hero: ModelDescriptor,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelRegistry {
    /// The catalogue compiled into the engine.
    pub fn builtin() -> Self {
        Self {
            models: MODEL_CATALOGUE.iter().map(ModelDescriptor::from).collect(),
            hero: builtin_hero(),
        }
    }

    /// Validate a deployed manifest. The hero falls back to the built-in tree.
    pub fn from_manifest(manifest: &RegistryManifest) -> Result<Self, RegistryError> {
        if manifest.models.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = std::collections::HashSet::new();
        for (index, model) in manifest.models.iter().enumerate() {
            if model.file.trim().is_empty() {
                return Err(RegistryError::MissingFile { index });
            }
            if !seen.insert(model.file.as_str()) {
                return Err(RegistryError::DuplicateFile(model.file.clone()));
            }
        }

        Ok(Self {
            models: manifest.models.clone(),
            hero: manifest.hero.clone().unwrap_or_else(builtin_hero),
        })
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn hero(&self) -> &ModelDescriptor {
        &self.hero
    }

    /// Models shown for project `project`: its group, plus every ungrouped
    /// model on the first project.
    pub fn for_project(&self, project: &str) -> Vec<ModelDescriptor> {
        let mut selected: Vec<ModelDescriptor> = self
            .models
            .iter()
            .filter(|model| model.group.as_deref() == Some(project))
            .cloned()
            .collect();

        if project == "1" {
            selected.extend(self.models.iter().filter(|m| !m.is_grouped()).cloned());
        }

        selected
    }

    /// Gallery order: grouped models by numeric group key, then ungrouped
    /// ones in catalogue order.
    pub fn gallery_order(&self) -> Vec<ModelDescriptor> {
        let mut grouped: Vec<&ModelDescriptor> =
            self.models.iter().filter(|m| m.is_grouped()).collect();
        // Stable sort keeps catalogue order within a group and for
        // non-numeric keys.
        grouped.sort_by_key(|m| m.group_order().unwrap_or(u32::MAX));

        grouped
            .into_iter()
            .chain(self.models.iter().filter(|m| !m.is_grouped()))
            .cloned()
            .collect()
    }

    /// Distinct group keys in numeric order.
    pub fn project_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for model in self.gallery_order() {
            if let Some(group) = model.group {
                if !ids.contains(&group) {
                    ids.push(group);
                }
            }
        }
        ids
    }
}

fn builtin_hero() -> ModelDescriptor {
    ModelDescriptor {
        fit_extent: Some(HERO_FIT_EXTENT),
        ..ModelDescriptor::from(&HERO_MODEL)
    }
}
