//! Engine Configuration - debug flag, quotas and storage settings
//!
//! An [`EngineConfig`] is fixed at construction. It can be built in code,
//! read from a RON file, and then adjusted from the environment:
//!
//! - `ZENITHFALL_DEBUG` (`1`, `true`, `yes`, `on`) enables debug mode
//! - `ZENITHFALL_DATA_DIR` points at the catalog directory

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use zenithfall_core::ActionKind;

/// Environment variable enabling debug mode
pub const ENV_DEBUG: &str = "ZENITHFALL_DEBUG";

/// Environment variable overriding the catalog directory
pub const ENV_DATA_DIR: &str = "ZENITHFALL_DATA_DIR";

/// Successful actions allowed per local day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyLimits {
    pub transmute: u32,
    pub craft: u32,
    pub explore: u32,
    pub gift: u32,
}

impl DailyLimits {
    /// Limit for an action kind
    pub fn get(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Transmute => self.transmute,
            ActionKind::Craft => self.craft,
            ActionKind::Explore => self.explore,
            ActionKind::Gift => self.gift,
        }
    }
}

impl Default for DailyLimits {
    fn default() -> Self {
        Self {
            transmute: 3,
            craft: 3,
            explore: 1,
            gift: 3,
        }
    }
}

/// Maximum number of entries per inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryCaps {
    pub materials: usize,
    pub items: usize,
    pub catalysts: usize,
}

impl Default for InventoryCaps {
    fn default() -> Self {
        Self {
            materials: 50,
            items: 30,
            catalysts: 20,
        }
    }
}

/// Configuration for engine execution
///
/// # Example
///
/// ```
/// use zenithfall_engine::EngineConfig;
///
/// let config = EngineConfig::from_ron_str("(debug: true, daily_limits: (craft: 5))").unwrap();
/// assert!(config.debug);
/// assert_eq!(config.daily_limits.craft, 5);
/// assert_eq!(config.daily_limits.explore, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bypass daily limits and inventory caps, and allow debug operations
    pub debug: bool,

    pub daily_limits: DailyLimits,

    pub inventory_caps: InventoryCaps,

    /// Offset of the local day boundary, in seconds east of UTC
    ///
    /// Defaults to UTC+9.
    pub utc_offset_secs: i32,

    /// Inactive local days after which the companion vanishes
    pub vanish_after_days: i64,

    /// Base seed mixed with each user ID to seed new runs
    pub seed: u64,

    /// Fresh-read retries after a version conflict before giving up
    pub max_commit_retries: u32,

    /// Directory holding the RON catalog tables
    pub data_dir: PathBuf,

    /// Database file; `None` keeps runs in memory
    pub db_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            daily_limits: DailyLimits::default(),
            inventory_caps: InventoryCaps::default(),
            utc_offset_secs: 9 * 3600,
            vanish_after_days: 30,
            seed: 12345,
            max_commit_retries: 8,
            data_dir: PathBuf::from("data"),
            db_path: None,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from RON; omitted fields take their defaults
    pub fn from_ron_str(content: &str) -> Result<Self> {
        ron::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read a configuration from a RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_ron_str(&content)
    }

    /// Apply `ZENITHFALL_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_DEBUG) {
            self.debug = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
    }

    /// Inventory caps in force, or `None` when debug lifts them
    pub fn effective_caps(&self) -> Option<InventoryCaps> {
        (!self.debug).then_some(self.inventory_caps)
    }
}
