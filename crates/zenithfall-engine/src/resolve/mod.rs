//! Resolvers: pure state transitions over a checked-out run
//!
//! Each resolver validates its input against the catalog, mutates the run it
//! is handed and returns what happened. Quotas, commits and retries are the
//! engine's concern. On error the run copy is discarded, so resolvers may
//! fail after partially mutating it.

pub mod craft;
pub mod equip;
pub mod explore;
pub mod gift;
pub mod transmute;

use crate::config::InventoryCaps;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use zenithfall_catalog::Catalog;
use zenithfall_core::Run;

/// Read-only inputs shared by every resolver
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub catalog: &'a Catalog,
    /// `None` when caps are lifted
    pub caps: Option<InventoryCaps>,
    pub now: DateTime<Utc>,
}

impl ResolveContext<'_> {
    pub(crate) fn ensure_material_room(&self, run: &Run, adding: usize) -> Result<()> {
        ensure_room("materials", run.inventory_materials.len(), adding, self.caps.map(|c| c.materials))
    }

    pub(crate) fn ensure_item_room(&self, run: &Run, adding: usize) -> Result<()> {
        ensure_room("items", run.inventory_items.len(), adding, self.caps.map(|c| c.items))
    }

    pub(crate) fn ensure_catalyst_room(&self, run: &Run, adding: usize) -> Result<()> {
        ensure_room("catalysts", run.inventory_catalysts.len(), adding, self.caps.map(|c| c.catalysts))
    }
}

fn ensure_room(inventory: &'static str, held: usize, adding: usize, cap: Option<usize>) -> Result<()> {
    match cap {
        Some(cap) if held + adding > cap => Err(Error::InventoryFull { inventory, cap }),
        _ => Ok(()),
    }
}

/// Grant the revival item to a vanished companion
///
/// The item is used up on the spot, so the flag never survives a commit.
/// Returns whether the companion came back.
pub(crate) fn grant_revival(run: &mut Run) -> bool {
    if !run.vanished {
        return false;
    }
    run.vanished = false;
    run.has_revival_item = false;
    true
}
