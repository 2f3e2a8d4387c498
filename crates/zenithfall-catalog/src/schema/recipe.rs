//! Recipe and catalyst definition schema

use serde::{Deserialize, Serialize};
use zenithfall_core::{DefId, Material};

/// One constraint slot of a recipe
///
/// `None` for `material` or `essence` is a wildcard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDef {
    #[serde(default)]
    pub material: Option<DefId>,
    #[serde(default)]
    pub essence: Option<DefId>,
    #[serde(default = "default_min_quality")]
    pub min_quality: u8,
}

fn default_min_quality() -> u8 {
    1
}

impl SlotDef {
    /// Check whether a material satisfies this slot
    pub fn accepts(&self, material: &Material) -> bool {
        let type_ok = self
            .material
            .as_ref()
            .map_or(true, |m| *m == material.material_type);
        let essence_ok = self
            .essence
            .as_ref()
            .map_or(true, |e| *e == material.essence);
        type_ok && essence_ok && material.quality >= self.min_quality
    }
}

/// Template for the item a recipe produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDef {
    #[serde(default)]
    pub tags: Vec<DefId>,
    /// Inclusive (low, high) quality range of the crafted item
    pub quality_range: (u8, u8),
    #[serde(default)]
    pub consumable: bool,
}

impl OutputDef {
    /// Floor of the average input quality, clamped to the output range
    pub fn quality_from(&self, qualities: &[u8]) -> u8 {
        let (low, high) = self.quality_range;
        if qualities.is_empty() {
            return low;
        }
        let sum: u32 = qualities.iter().map(|q| u32::from(*q)).sum();
        let average = sum / qualities.len() as u32;
        average.clamp(u32::from(low), u32::from(high)) as u8
    }
}

/// Definition of a craftable recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDef {
    pub id: DefId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Minimum run rank required to craft
    #[serde(default = "default_rank")]
    pub rank: u32,
    /// Constraint slots, matched in declaration order
    pub slots: Vec<SlotDef>,
    pub output: OutputDef,
    /// Catalyst definition that must accompany the materials
    #[serde(default)]
    pub catalyst: Option<DefId>,
}

fn default_rank() -> u32 {
    1
}

/// Definition of a catalyst obtainable from dungeons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalystDef {
    pub id: DefId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub material: DefId,
    pub essence: DefId,
}

/// On-disk layout of `recipes.ron`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeFile {
    #[serde(default)]
    pub catalysts: Vec<CatalystDef>,
    pub recipes: Vec<RecipeDef>,
}
