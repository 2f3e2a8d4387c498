//! Material schema: material types, essences and quality bounds

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use zenithfall_core::DefId;

/// A physical material class a photo can be classified as (metal, wood...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialTypeDef {
    pub id: DefId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A conceptual essence a photo can carry (control, fire, growth...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssenceDef {
    pub id: DefId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Valid quality range and transmutation variance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityBounds {
    #[serde(default = "default_min")]
    pub min: u8,
    #[serde(default = "default_max")]
    pub max: u8,
    /// Largest step a nudge may move quality by
    #[serde(default = "default_nudge")]
    pub nudge: u8,
    /// Probability that a transmutation nudges quality at all
    #[serde(default)]
    pub nudge_chance: f64,
    /// Display names from `min` upward
    #[serde(default)]
    pub names: Vec<String>,
}

fn default_min() -> u8 {
    1
}

fn default_max() -> u8 {
    5
}

fn default_nudge() -> u8 {
    1
}

impl QualityBounds {
    pub fn contains(&self, quality: i64) -> bool {
        quality >= i64::from(self.min) && quality <= i64::from(self.max)
    }

    /// Clamp an arbitrary value into the bounds
    pub fn clamp(&self, quality: i64) -> u8 {
        quality.clamp(i64::from(self.min), i64::from(self.max)) as u8
    }

    /// Display name for a quality level, if the schema names it
    pub fn name_of(&self, quality: u8) -> Option<&str> {
        let index = quality.checked_sub(self.min)? as usize;
        self.names.get(index).map(String::as_str)
    }
}

impl Default for QualityBounds {
    fn default() -> Self {
        Self {
            min: default_min(),
            max: default_max(),
            nudge: default_nudge(),
            nudge_chance: 0.0,
            names: Vec::new(),
        }
    }
}

/// On-disk layout of `materials.ron`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    pub materials: Vec<MaterialTypeDef>,
    pub essences: Vec<EssenceDef>,
    #[serde(default)]
    pub quality: QualityBounds,
}

/// Loaded material schema keyed by ID
#[derive(Debug, Clone, Default)]
pub struct MaterialSchema {
    pub materials: IndexMap<DefId, MaterialTypeDef>,
    pub essences: IndexMap<DefId, EssenceDef>,
    pub quality: QualityBounds,
}

impl MaterialSchema {
    pub fn has_material(&self, id: &DefId) -> bool {
        self.materials.contains_key(id)
    }

    pub fn has_essence(&self, id: &DefId) -> bool {
        self.essences.contains_key(id)
    }
}
