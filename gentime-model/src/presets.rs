//! Named reference scenarios bundled with the crate.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::inputs::ModelInputs;

const DEFAULT_PRESET_DATA: &str = include_str!("../assets/presets.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub inputs: ModelInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PresetCatalog {
    #[serde(default)]
    pub presets: Vec<Preset>,
}

impl PresetCatalog {
    /// Load the bundled catalog, falling back to an empty one if it is malformed.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_PRESET_DATA).unwrap_or_default()
    }

    /// Parse a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or an input block carries
    /// unknown fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.id == id)
    }

    /// Preset identifiers in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|preset| preset.id.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Preset> {
        self.presets.iter()
    }
}

/// Process-wide bundled catalog.
#[must_use]
pub fn catalog() -> &'static PresetCatalog {
    static CATALOG: OnceLock<PresetCatalog> = OnceLock::new();
    CATALOG.get_or_init(PresetCatalog::load_from_static)
}
