//! Recipe matching and item creation

use super::{grant_revival, ResolveContext};
use crate::error::{Error, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use zenithfall_catalog::{RecipeDef, SlotDef};
use zenithfall_core::{CatalystId, DefId, Item, Material, MaterialId, Run};

/// Materials (and optionally a catalyst) offered to the crafting table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftOrder {
    pub material_ids: Vec<MaterialId>,
    #[serde(default)]
    pub catalyst_id: Option<CatalystId>,
}

/// Result of a successful craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crafted {
    pub item: Item,
    pub recipe_id: DefId,
    pub consumed: Vec<MaterialId>,
    pub catalyst_used: Option<CatalystId>,
    pub revived: bool,
}

/// Consume the offered materials into the first recipe they fully satisfy
pub fn craft(ctx: &ResolveContext<'_>, run: &mut Run, order: CraftOrder) -> Result<Crafted> {
    if order.material_ids.is_empty() {
        return Err(Error::MalformedPayload("material_ids is empty".into()));
    }
    let unique: IndexSet<&MaterialId> = order.material_ids.iter().collect();
    if unique.len() != order.material_ids.len() {
        return Err(Error::MalformedPayload("material_ids contains duplicates".into()));
    }

    let pool = order
        .material_ids
        .iter()
        .map(|id| {
            run.inventory_materials
                .get(id)
                .ok_or_else(|| Error::UnknownMaterial(id.clone()))
        })
        .collect::<Result<Vec<&Material>>>()?;

    let catalyst_def = match &order.catalyst_id {
        Some(id) => Some(
            run.inventory_catalysts
                .get(id)
                .map(|c| c.catalyst_id.clone())
                .ok_or_else(|| Error::UnknownCatalyst(id.clone()))?,
        ),
        None => None,
    };

    let recipe = ctx
        .catalog
        .recipes_for_rank(run.rank)
        .filter(|r| r.catalyst == catalyst_def && r.slots.len() == pool.len())
        .find(|r| assign(&r.slots, &pool).is_some())
        .ok_or(Error::NoMatchingRecipe)?;

    ctx.ensure_item_room(run, 1)?;

    let qualities: Vec<u8> = pool.iter().map(|m| m.quality).collect();
    let item = build_item(run, recipe, &qualities, ctx);

    for id in &order.material_ids {
        run.inventory_materials.shift_remove(id);
    }
    if let Some(id) = &order.catalyst_id {
        run.inventory_catalysts.shift_remove(id);
    }
    run.inventory_items.insert(item.id.clone(), item.clone());

    tracing::debug!(recipe = %recipe.id, quality = item.quality, "recipe matched");

    Ok(Crafted {
        item,
        recipe_id: recipe.id.clone(),
        consumed: order.material_ids,
        catalyst_used: order.catalyst_id,
        revived: grant_revival(run),
    })
}

fn build_item(run: &mut Run, recipe: &RecipeDef, qualities: &[u8], ctx: &ResolveContext<'_>) -> Item {
    Item {
        id: run.new_item_id(),
        recipe_id: recipe.id.clone(),
        name: recipe.name.clone(),
        quality: recipe.output.quality_from(qualities),
        tags: recipe.output.tags.clone(),
        consumable: recipe.output.consumable,
        created_at: ctx.now,
    }
}

/// Assign one material per slot, slots in declaration order, lowest quality first
///
/// Returns pool indices in slot order, or `None` if no complete assignment exists.
fn assign(slots: &[SlotDef], pool: &[&Material]) -> Option<Vec<usize>> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by_key(|&i| pool[i].quality);

    let mut used = vec![false; pool.len()];
    let mut picks = Vec::with_capacity(slots.len());
    fill(slots, pool, &order, &mut used, &mut picks).then_some(picks)
}

fn fill(
    slots: &[SlotDef],
    pool: &[&Material],
    order: &[usize],
    used: &mut [bool],
    picks: &mut Vec<usize>,
) -> bool {
    let Some(slot) = slots.get(picks.len()) else {
        return true;
    };
    for &i in order {
        if used[i] || !slot.accepts(pool[i]) {
            continue;
        }
        used[i] = true;
        picks.push(i);
        if fill(slots, pool, order, used, picks) {
            return true;
        }
        picks.pop();
        used[i] = false;
    }
    false
}
