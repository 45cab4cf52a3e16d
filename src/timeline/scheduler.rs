// src/timeline/scheduler.rs
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::timeline::service::{CycleOutcome, TimelineService};

pub const DEFAULT_STALENESS_SECS: u64 = 3 * 60 * 60;
pub const DEFAULT_TICK_SECS: u64 = 5 * 60;

/// How long a successful refresh stays good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Staleness {
    pub interval: Duration,
}

impl Default for Staleness {
    fn default() -> Self {
        Self::from_secs(DEFAULT_STALENESS_SECS)
    }
}

impl Staleness {
    pub fn from_secs(secs: u64) -> Self {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1_000);
        Self {
            interval: Duration::seconds(secs),
        }
    }

    /// No prior success, or the last one is older than the interval.
    pub fn is_stale(&self, last_success: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_success {
            None => true,
            Some(last) => now - last > self.interval,
        }
    }
}

/// Background ticker calling `load_events()`. The first tick fires immediately.
pub fn spawn_scheduler(service: Arc<TimelineService>, tick: StdDuration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let outcome = service.load_events().await;
            counter!("timeline_scheduler_ticks_total").increment(1);
            match &outcome {
                CycleOutcome::Skipped(reason) => {
                    tracing::debug!(target: "timeline", ?reason, "scheduler tick skipped");
                }
                other => {
                    tracing::info!(target: "timeline", outcome = other.label(), "scheduler tick");
                }
            }
        }
    })
}
