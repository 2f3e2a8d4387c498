//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use native_db::*;
use std::path::Path;
use std::sync::LazyLock;
use zenithfall_core::{Run, UserId};

// Static models for the database
static MODELS: LazyLock<std::result::Result<Models, String>> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredRun>().map_err(|e| e.to_string())?;
    Ok(models)
});

fn models() -> Result<&'static Models> {
    MODELS.as_ref().map_err(|e| Error::Database(e.clone()))
}

/// Keyed store of one run per user.
///
/// Every write is a single read-write transaction, so a commit either lands
/// completely or not at all. Writers are serialized by the database, which
/// makes the version check inside [`Store::commit`] a true compare-and-swap.
pub struct Store {
    db: Database<'static>,
    debug: bool,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(models()?, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db, debug: false })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(models()?)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db, debug: false })
    }

    /// Allow or forbid [`Store::overwrite`].
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Load the run for `user_id`, creating it with `init` if absent.
    ///
    /// `init` runs only when no record exists. Returns the run and whether it
    /// was created by this call.
    pub fn get_or_create<E>(
        &self,
        user_id: &UserId,
        init: impl FnOnce() -> std::result::Result<Run, E>,
    ) -> std::result::Result<(Run, bool), E>
    where
        E: From<Error>,
    {
        let rw = self.db.rw_transaction().map_err(Error::from)?;
        let existing: Option<StoredRun> = rw
            .get()
            .primary(user_id.as_str().to_string())
            .map_err(Error::from)?;
        if let Some(stored) = existing {
            return Ok((stored.to_run()?, false));
        }

        let mut run = init()?;
        run.version = 1;
        rw.insert(StoredRun::from_run(&run)?).map_err(Error::from)?;
        rw.commit().map_err(Error::from)?;

        tracing::debug!(user = %user_id, "run created");
        Ok((run, true))
    }

    /// Load the run for `user_id`, if any.
    pub fn load(&self, user_id: &UserId) -> Result<Option<Run>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredRun> = r.get().primary(user_id.as_str().to_string())?;
        stored.map(|s| s.to_run()).transpose()
    }

    /// Load the run for `user_id`.
    pub fn read(&self, user_id: &UserId) -> Result<Run> {
        self.load(user_id)?
            .ok_or_else(|| Error::NotFound(user_id.to_string()))
    }

    /// Persist `run` if nobody else committed since it was read.
    ///
    /// On success the run's version is bumped to the stored one.
    pub fn commit(&self, run: &mut Run) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredRun> = rw.get().primary(run.user_id.as_str().to_string())?;
        let stored = stored.ok_or_else(|| Error::NotFound(run.user_id.to_string()))?;
        if stored.version != run.version {
            return Err(Error::VersionConflict {
                user_id: run.user_id.to_string(),
                expected: run.version,
                found: stored.version,
            });
        }

        let mut next = run.clone();
        next.version = stored.version + 1;
        rw.upsert(StoredRun::from_run(&next)?)?;
        rw.commit()?;

        run.version = next.version;
        Ok(())
    }

    /// Replace a run unconditionally, ignoring the stored version.
    ///
    /// Only available in debug mode. Returns the run as stored.
    pub fn overwrite(&self, run: Run) -> Result<Run> {
        if !self.debug {
            return Err(Error::DebugDisabled);
        }

        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredRun> = rw.get().primary(run.user_id.as_str().to_string())?;
        let mut next = run;
        next.version = stored.map_or(1, |s| s.version + 1);
        rw.upsert(StoredRun::from_run(&next)?)?;
        rw.commit()?;

        tracing::warn!(user = %next.user_id, version = next.version, "run overwritten");
        Ok(next)
    }
}
