//! Daily quotas, local-day rollover and the debug gate

use crate::config::DailyLimits;
use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, Utc};
use zenithfall_core::time::{days_between, local_day};
use zenithfall_core::{ActionKind, Run};

/// Enforces per-user daily limits in a fixed local time zone
#[derive(Debug, Clone)]
pub struct Governor {
    limits: DailyLimits,
    offset: FixedOffset,
    debug: bool,
    vanish_after_days: i64,
}

impl Governor {
    pub fn new(
        limits: DailyLimits,
        offset: FixedOffset,
        debug: bool,
        vanish_after_days: i64,
    ) -> Self {
        Self {
            limits,
            offset,
            debug,
            vanish_after_days,
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn limit(&self, kind: ActionKind) -> u32 {
        self.limits.get(kind)
    }

    /// Zero the counters if `now` falls on a new local day
    pub fn roll_over(&self, run: &mut Run, now: DateTime<Utc>) -> bool {
        run.daily.roll_over(local_day(now, self.offset))
    }

    /// Require room for one more `kind` today; skipped in debug mode
    pub fn check(&self, run: &Run, kind: ActionKind) -> Result<()> {
        if self.debug {
            return Ok(());
        }
        let limit = self.limit(kind);
        if run.daily.count(kind) >= limit {
            return Err(Error::DailyLimitExceeded {
                action: kind,
                limit,
            });
        }
        Ok(())
    }

    /// Count a successful action; counted in debug mode too
    pub fn record(&self, run: &mut Run, kind: ActionKind) -> u32 {
        run.daily.increment(kind)
    }

    /// Actions of `kind` left today, `None` when unlimited
    pub fn remaining(&self, run: &Run, kind: ActionKind) -> Option<u32> {
        (!self.debug).then(|| self.limit(kind).saturating_sub(run.daily.count(kind)))
    }

    /// Gate for debug-only operations
    pub fn require_debug(&self, operation: &str) -> Result<()> {
        if self.debug {
            Ok(())
        } else {
            tracing::warn!(operation, "debug operation rejected");
            Err(Error::DebugDisabled)
        }
    }

    /// Debug reset of every counter
    pub fn reset(&self, run: &mut Run, now: DateTime<Utc>) {
        run.daily.reset(local_day(now, self.offset));
    }

    /// Mark the companion vanished after a long absence; returns whether it just vanished
    pub fn check_vanish(&self, run: &mut Run, now: DateTime<Utc>) -> bool {
        if run.vanished {
            return false;
        }
        if days_between(run.last_active, now, self.offset) >= self.vanish_after_days {
            run.vanished = true;
            run.has_revival_item = false;
            return true;
        }
        false
    }
}
