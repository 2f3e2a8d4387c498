//! Photo classification to material

use super::{grant_revival, ResolveContext};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use zenithfall_core::{DefId, Material, RandomSource, Run};

/// A caller-classified photo observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub material_type: DefId,
    pub essence: DefId,
    pub quality: i64,
    #[serde(default)]
    pub hint_text: String,
}

/// Result of a transmutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transmuted {
    pub material: Material,
    /// How far the stored quality moved from the detected one
    pub quality_shift: i64,
    /// Display name of the stored quality, if the schema names it
    pub quality_name: Option<String>,
    pub revived: bool,
}

/// Turn an observation into one material
pub fn transmute(
    ctx: &ResolveContext<'_>,
    run: &mut Run,
    observation: Observation,
    rng: &mut impl RandomSource,
) -> Result<Transmuted> {
    let schema = &ctx.catalog.schema;
    if !schema.has_material(&observation.material_type) {
        return Err(Error::InvalidClassification(format!(
            "unknown material type {}",
            observation.material_type
        )));
    }
    if !schema.has_essence(&observation.essence) {
        return Err(Error::InvalidClassification(format!(
            "unknown essence {}",
            observation.essence
        )));
    }
    let bounds = &schema.quality;
    if !bounds.contains(observation.quality) {
        return Err(Error::InvalidClassification(format!(
            "quality {} outside {}..={}",
            observation.quality, bounds.min, bounds.max
        )));
    }
    ctx.ensure_material_room(run, 1)?;

    let mut shift = 0;
    if bounds.nudge > 0 && rng.chance(bounds.nudge_chance) {
        let step = rng.range_i64(1, i64::from(bounds.nudge));
        shift = if rng.chance(0.5) { step } else { -step };
    }
    let quality = bounds.clamp(observation.quality + shift);
    tracing::debug!(detected = observation.quality, quality, "quality nudge");

    let material = Material {
        id: run.new_material_id(),
        material_type: observation.material_type,
        essence: observation.essence,
        quality,
        source_hint: observation.hint_text,
        created_at: ctx.now,
    };
    run.inventory_materials
        .insert(material.id.clone(), material.clone());

    Ok(Transmuted {
        quality_shift: i64::from(quality) - observation.quality,
        quality_name: bounds.name_of(quality).map(str::to_owned),
        material,
        revived: grant_revival(run),
    })
}
