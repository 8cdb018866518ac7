use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use constants::catalogue::CatalogueEntry;

/// Plain `{x, y, z}` triple as written in the registry manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis3 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl From<Axis3> for Vec3 {
    fn from(value: Axis3) -> Self {
        Vec3::new(value.x, value.y, value.z)
    }
}

/// Static data describing one loadable model and its placement.
///
/// `rotation` is in radians and applied as XYZ Euler angles after the model
/// has been re-centred on its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub file: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub position: Axis3,
    #[serde(default)]
    pub rotation: Axis3,
    #[serde(default)]
    pub group: Option<String>,
    /// Largest dimension the centred model is fitted to before `scale`.
    #[serde(default, rename = "fitExtent")]
    pub fit_extent: Option<f32>,
}

fn default_scale() -> f32 {
    1.0
}

impl ModelDescriptor {
    /// Display title, falling back to the file name like the cards do.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.file
        } else {
            &self.title
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.group.is_some()
    }

    /// Numeric value of the group key, used for gallery ordering.
    pub fn group_order(&self) -> Option<u32> {
        self.group.as_deref().and_then(|g| g.trim().parse().ok())
    }
}

impl From<&CatalogueEntry> for ModelDescriptor {
    fn from(entry: &CatalogueEntry) -> Self {
        Self {
            file: entry.file.to_string(),
            title: entry.title.to_string(),
            subtitle: entry.subtitle.to_string(),
            tags: entry.tags.iter().map(|t| t.to_string()).collect(),
            scale: 1.0,
            position: Axis3::default(),
            rotation: Axis3::default(),
            group: entry.group.map(str::to_string),
            fit_extent: None,
        }
    }
}
