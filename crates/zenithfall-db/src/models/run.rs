//! Run record model.

use crate::error::Result;
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use zenithfall_core::Run;

/// Stored run in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredRun {
    /// Primary key - user ID.
    #[primary_key]
    pub user_id: String,
    /// Copy of the run's version, compared on commit without decoding `data`.
    pub version: u64,
    /// Bincode-encoded run.
    pub data: Vec<u8>,
}

impl StoredRun {
    /// Encode a run.
    pub fn from_run(run: &Run) -> Result<Self> {
        Ok(Self {
            user_id: run.user_id.as_str().to_string(),
            version: run.version,
            data: bincode::serialize(run)?,
        })
    }

    /// Decode the stored run.
    pub fn to_run(&self) -> Result<Run> {
        let mut run: Run = bincode::deserialize(&self.data)?;
        run.version = self.version;
        Ok(run)
    }
}
