//! Engine - operation entry points over the catalog and run store
//!
//! Every mutation follows the same path:
//!
//! ```text
//! read run (with version)
//!  ├── local-day rollover, vanish check
//!  ├── quota check
//!  ├── resolver on the checked-out copy
//!  ├── quota record, activity stamp
//!  └── compare-and-swap commit ──conflict──> retry from a fresh read
//! ```

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::governor::Governor;
use crate::request::{Request, RunPatch};
use crate::resolve::craft::{self, CraftOrder, Crafted};
use crate::resolve::equip;
use crate::resolve::explore::{self, Expedition, Explored};
use crate::resolve::gift::{self, Gifted};
use crate::resolve::transmute::{self, Observation, Transmuted};
use crate::resolve::ResolveContext;
use crate::response::{DungeonSummary, Quota, RecipeSummary, Response, RunStatus, StartedRun};
use chrono::{DateTime, Utc};
use zenithfall_catalog::{Catalog, Loader};
use zenithfall_core::time::{local_day, utc_offset};
use zenithfall_core::{
    ActionKind, CatalystId, Clock, DefId, GameRng, ItemId, MaterialId, Run, SystemClock, UserId,
};
use zenithfall_db::Store;

/// The rules engine
///
/// Operations take `&self`; share one engine across threads with `Arc`.
pub struct Engine<C: Clock = SystemClock> {
    catalog: Catalog,
    store: Store,
    config: EngineConfig,
    governor: Governor,
    clock: C,
}

impl Engine<SystemClock> {
    /// Load the catalog from `config.data_dir` and open the configured store
    pub fn open(config: EngineConfig) -> Result<Self> {
        let catalog = Loader::from_directory(&config.data_dir)?;
        let store = match &config.db_path {
            Some(path) => Store::open(path)?,
            None => Store::in_memory()?,
        };
        Self::new(catalog, store, config, SystemClock)
    }
}

impl<C: Clock> Engine<C> {
    pub fn new(catalog: Catalog, store: Store, config: EngineConfig, clock: C) -> Result<Self> {
        let offset = utc_offset(config.utc_offset_secs)?;
        let governor = Governor::new(
            config.daily_limits.clone(),
            offset,
            config.debug,
            config.vanish_after_days,
        );
        tracing::info!(debug = config.debug, utc_offset = config.utc_offset_secs, "engine ready");
        Ok(Self {
            catalog,
            store: store.with_debug(config.debug),
            config,
            governor,
            clock,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn context(&self, now: DateTime<Utc>) -> ResolveContext<'_> {
        ResolveContext {
            catalog: &self.catalog,
            caps: self.config.effective_caps(),
            now,
        }
    }

    /// Run one mutation with quota handling and optimistic retries
    fn mutate<T>(
        &self,
        user: &UserId,
        op: &'static str,
        action: Option<ActionKind>,
        resolve: impl Fn(&ResolveContext<'_>, &mut Run, &mut GameRng) -> Result<T>,
    ) -> Result<T> {
        let attempts = self.config.max_commit_retries.saturating_add(1);
        for attempt in 1..=attempts {
            let mut run = self.store.read(user)?;
            let now = self.clock.now();
            self.governor.roll_over(&mut run, now);
            if self.governor.check_vanish(&mut run, now) {
                tracing::info!(user = %user, "companion vanished");
            }
            if let Some(kind) = action {
                self.governor.check(&run, kind)?;
            }

            let mut rng = run.rng();
            let out = resolve(&self.context(now), &mut run, &mut rng)?;
            run.store_rng(&rng);
            if let Some(kind) = action {
                self.governor.record(&mut run, kind);
            }
            run.touch(now);

            match self.store.commit(&mut run) {
                Ok(()) => {
                    tracing::info!(user = %user, op, version = run.version, "operation committed");
                    return Ok(out);
                }
                Err(zenithfall_db::Error::VersionConflict { found, .. }) => {
                    tracing::warn!(user = %user, op, attempt, found, "version conflict, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(Error::Contention {
            user_id: user.to_string(),
            attempts,
        })
    }

    /// Create the run on first call; later calls load it and ignore the payload
    pub fn start_run(
        &self,
        user: &UserId,
        race_id: &DefId,
        partner_name: Option<&str>,
    ) -> Result<StartedRun> {
        let now = self.clock.now();
        let (run, created) = self.store.get_or_create(user, || {
            let race = self
                .catalog
                .race(race_id)
                .ok_or_else(|| Error::InvalidInit(format!("unknown race {}", race_id)))?;
            let name = partner_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(race.default_name.as_str());
            let seed = GameRng::derive_seed(self.config.seed, user.as_str());
            let mut run = Run::new(user.clone(), race.id.clone(), name, seed, now);
            run.daily.reset(local_day(now, self.governor.offset()));
            Ok::<_, Error>(run)
        })?;
        let run = if created {
            tracing::info!(user = %user, race = %run.race_id, companion = %run.companion_name, "run started");
            run
        } else {
            // Returning counts as activity once the vanish check has been recorded
            self.mutate(user, "start_run", None, |_, run, _| Ok(run.clone()))?
        };
        Ok(StartedRun {
            created,
            status: self.status_of(run, now),
        })
    }

    pub fn transmute_photo(
        &self,
        user: &UserId,
        observation: Observation,
    ) -> Result<Transmuted> {
        self.mutate(user, "transmute_photo", Some(ActionKind::Transmute), |ctx, run, rng| {
            transmute::transmute(ctx, run, observation.clone(), rng)
        })
    }

    pub fn craft_item(
        &self,
        user: &UserId,
        material_ids: Vec<MaterialId>,
        catalyst_id: Option<CatalystId>,
    ) -> Result<Crafted> {
        let order = CraftOrder {
            material_ids,
            catalyst_id,
        };
        self.mutate(user, "craft_item", Some(ActionKind::Craft), |ctx, run, _| {
            craft::craft(ctx, run, order.clone())
        })
    }

    pub fn explore(&self, user: &UserId, dungeon_id: &DefId, style: &DefId) -> Result<Explored> {
        let expedition = Expedition {
            dungeon_id: dungeon_id.clone(),
            style: style.clone(),
        };
        self.mutate(user, "explore", Some(ActionKind::Explore), |ctx, run, rng| {
            explore::explore(ctx, run, expedition.clone(), rng)
        })
    }

    pub fn gift(&self, user: &UserId, item_id: &ItemId) -> Result<Gifted> {
        self.mutate(user, "gift", Some(ActionKind::Gift), |ctx, run, _| {
            gift::gift(ctx, run, item_id.clone())
        })
    }

    /// Equip an item; returns the equipped set
    pub fn equip(&self, user: &UserId, item_id: &ItemId) -> Result<Vec<ItemId>> {
        self.mutate(user, "equip", None, |ctx, run, _| {
            equip::equip(ctx, run, item_id)?;
            Ok(run.equipped.clone())
        })
    }

    /// Unequip an item; returns the equipped set
    pub fn unequip(&self, user: &UserId, item_id: &ItemId) -> Result<Vec<ItemId>> {
        self.mutate(user, "unequip", None, |_, run, _| {
            equip::unequip(run, item_id)?;
            Ok(run.equipped.clone())
        })
    }

    /// Current view of a run, with today's quotas
    pub fn get_status(&self, user: &UserId) -> Result<RunStatus> {
        let run = self.store.read(user)?;
        Ok(self.status_of(run, self.clock.now()))
    }

    /// Dungeons unlocked at the run's rank, in catalog order
    pub fn get_available_dungeons(&self, user: &UserId) -> Result<Vec<DungeonSummary>> {
        let run = self.store.read(user)?;
        Ok(self
            .catalog
            .dungeons_for_rank(run.rank)
            .map(|d| DungeonSummary {
                id: d.id.clone(),
                name: d.name.clone(),
                region: d.region.clone(),
                tier: d.tier,
                max_depth: d.max_depth,
                progress: run.progress(&d.id),
                styles: d.styles.keys().cloned().collect(),
                risk_tags: d.risk_tags.clone(),
            })
            .collect())
    }

    /// Every catalog recipe, in catalog order
    pub fn get_recipes(&self) -> Vec<RecipeSummary> {
        self.catalog
            .recipes
            .values()
            .map(|r| RecipeSummary {
                id: r.id.clone(),
                name: r.name.clone(),
                description: r.description.clone(),
                rank: r.rank,
                slots: r.slots.clone(),
                catalyst: r.catalyst.clone(),
                tags: r.output.tags.clone(),
                quality_range: r.output.quality_range,
            })
            .collect()
    }

    /// Debug: zero today's counters
    pub fn reset_daily(&self, user: &UserId) -> Result<RunStatus> {
        self.governor.require_debug("reset_daily")?;
        let run = self.mutate(user, "reset_daily", None, |ctx, run, _| {
            self.governor.reset(run, ctx.now);
            Ok(run.clone())
        })?;
        Ok(self.status_of(run, self.clock.now()))
    }

    /// Debug: patch a run in place without validation
    pub fn set_state(&self, user: &UserId, patch: RunPatch) -> Result<RunStatus> {
        self.governor.require_debug("set_state")?;
        let mut run = self.store.read(user)?;
        patch.apply(&mut run);
        let run = self.store.overwrite(run)?;
        tracing::info!(user = %user, op = "set_state", version = run.version, "operation committed");
        Ok(self.status_of(run, self.clock.now()))
    }

    /// Debug: the raw stored run
    pub fn get_state(&self, user: &UserId) -> Result<Run> {
        self.governor.require_debug("get_state")?;
        Ok(self.store.read(user)?)
    }

    /// Route a decoded request to its operation
    pub fn dispatch(&self, user: &UserId, request: Request) -> Result<Response> {
        tracing::debug!(user = %user, op = request.op(), "dispatch");
        Ok(match request {
            Request::StartRun {
                race_id,
                partner_name,
            } => Response::Started(self.start_run(user, &race_id, partner_name.as_deref())?),
            Request::TransmutePhoto {
                hint_text,
                detected_material,
                detected_essence,
                detected_quality,
            } => Response::Transmuted(self.transmute_photo(
                user,
                Observation {
                    material_type: detected_material,
                    essence: detected_essence,
                    quality: detected_quality,
                    hint_text: hint_text.unwrap_or_default(),
                },
            )?),
            Request::CraftItem {
                material_ids,
                catalyst_id,
            } => Response::Crafted(self.craft_item(user, material_ids, catalyst_id)?),
            Request::Explore { dungeon_id, style } => {
                Response::Explored(self.explore(user, &dungeon_id, &style)?)
            }
            Request::Gift { item_id } => Response::Gifted(self.gift(user, &item_id)?),
            Request::Equip { item_id } => Response::Equipment(self.equip(user, &item_id)?),
            Request::Unequip { item_id } => Response::Equipment(self.unequip(user, &item_id)?),
            Request::GetStatus {} => Response::Status(self.get_status(user)?),
            Request::GetAvailableDungeons {} => {
                Response::Dungeons(self.get_available_dungeons(user)?)
            }
            Request::GetRecipes {} => Response::Recipes(self.get_recipes()),
            Request::ResetDaily {} => Response::Status(self.reset_daily(user)?),
            Request::SetState { patch } => Response::Status(self.set_state(user, patch)?),
            Request::GetState {} => Response::State(Box::new(self.get_state(user)?)),
        })
    }

    /// Decode a JSON payload for `user` and dispatch it
    pub fn handle_json(&self, user: &str, payload: &str) -> Result<Response> {
        let user = UserId::parse(user)?;
        let request = Request::from_json(payload)?;
        self.dispatch(&user, request)
    }

    fn status_of(&self, mut run: Run, now: DateTime<Utc>) -> RunStatus {
        // Display only; nothing here is committed
        self.governor.roll_over(&mut run, now);
        self.governor.check_vanish(&mut run, now);

        let quotas = ActionKind::ALL
            .iter()
            .map(|&action| Quota {
                action,
                used: run.daily.count(action),
                remaining: self.governor.remaining(&run, action),
            })
            .collect();
        RunStatus {
            rank_name: self.catalog.rank_name(run.rank).map(str::to_owned),
            quotas,
            user_id: run.user_id,
            race_id: run.race_id,
            companion_name: run.companion_name,
            companion_affinity: run.companion_affinity,
            phase: run.phase,
            rank: run.rank,
            vanished: run.vanished,
            materials: run.inventory_materials.into_values().collect(),
            items: run.inventory_items.into_values().collect(),
            catalysts: run.inventory_catalysts.into_values().collect(),
            equipped: run.equipped,
            exploration_progress: run.exploration_progress,
        }
    }
}
