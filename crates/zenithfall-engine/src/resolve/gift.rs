//! Gifting items to the companion

use super::ResolveContext;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use zenithfall_catalog::AffinityCurve;
use zenithfall_core::{ItemId, Run};

/// Result of a gift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gifted {
    pub item_id: ItemId,
    pub affinity: u32,
    pub delta: u32,
    /// Whether one of the item's tags is a race favourite
    pub liked: bool,
    pub phase: u8,
    pub phase_up: bool,
}

/// Affinity gain for a base bonus at the current affinity, before the ceiling
///
/// `floor(base * half_point / (half_point + affinity))`, never below `min_delta`.
pub fn affinity_gain(curve: &AffinityCurve, base: u32, affinity: u32) -> u32 {
    let half = u64::from(curve.half_point);
    let raw = u64::from(base) * half / (half + u64::from(affinity));
    (raw as u32).max(curve.min_delta)
}

/// Hand an item to the companion; the item is always used up
pub fn gift(ctx: &ResolveContext<'_>, run: &mut Run, item_id: ItemId) -> Result<Gifted> {
    let race = ctx
        .catalog
        .race(&run.race_id)
        .ok_or_else(|| Error::NotFound(format!("race {}", run.race_id)))?;
    let item = run
        .remove_item(&item_id)
        .ok_or_else(|| Error::UnknownItem(item_id.clone()))?;

    let (base, liked) = race.gift_base(&item.tags);
    let curve = &race.growth;
    let gain = affinity_gain(curve, base, run.companion_affinity);
    // Capped at the curve maximum, but never below the current value
    let affinity = run
        .companion_affinity
        .saturating_add(gain)
        .min(curve.max)
        .max(run.companion_affinity);
    let delta = affinity.saturating_sub(run.companion_affinity);

    let previous_phase = run.phase;
    run.companion_affinity = affinity;
    run.phase = curve.phase_for(affinity);

    tracing::debug!(base, gain, delta, liked, "gift applied");

    Ok(Gifted {
        item_id,
        affinity,
        delta,
        liked,
        phase: run.phase,
        phase_up: run.phase > previous_phase,
    })
}
