// src/timeline/service.rs
//! The refresh cycle: resolve artists, fetch both sources, merge, publish, persist.
//!
//! Published state sits behind one `RwLock`; only a cycle (or a cache clear)
//! writes it, and the in-flight flag keeps cycles from overlapping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{CacheError, TimelineError};
use crate::event::Event;
use crate::ingest::ensure_metrics_described;
use crate::ingest::fetchers::{ConcertFetcher, NewsFetcher};
use crate::timeline::aggregate::{merge, sort_and_trim, AggregateOutcome, Notice};
use crate::timeline::artists::ArtistResolver;
use crate::timeline::cache::EventCache;
use crate::timeline::clock::Clock;
use crate::timeline::scheduler::Staleness;

/// What the timeline currently shows, plus the flags a UI needs around it.
///
/// `is_loading` mirrors the in-flight flag at the time the snapshot is taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineSnapshot {
    pub events: Vec<Event>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub has_partial_data: bool,
    pub warning: Option<String>,
    pub last_refresh: Option<DateTime<Utc>>,
}

impl TimelineSnapshot {
    /// Nothing to show and the last cycle failed outright.
    pub fn show_full_error(&self) -> bool {
        self.events.is_empty() && self.last_error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InFlight,
    Fresh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Skipped(SkipReason),
    Updated { events: usize, partial: bool },
    FellBackToCache { cached: usize, error: TimelineError },
    Failed { error: TimelineError },
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Skipped(_) => "skipped",
            CycleOutcome::Updated { partial: false, .. } => "updated",
            CycleOutcome::Updated { partial: true, .. } => "partial",
            CycleOutcome::FellBackToCache { .. } => "cached",
            CycleOutcome::Failed { .. } => "failed",
        }
    }
}

/// Everything a service needs; assembled by the caller.
pub struct TimelineParts {
    pub concerts: ConcertFetcher,
    pub news: NewsFetcher,
    pub artists: ArtistResolver,
    pub cache: EventCache,
    pub clock: Arc<dyn Clock>,
    pub staleness: Staleness,
    pub max_timeline_size: usize,
}

pub struct TimelineService {
    concerts: ConcertFetcher,
    news: NewsFetcher,
    artists: ArtistResolver,
    cache: EventCache,
    clock: Arc<dyn Clock>,
    staleness: Staleness,
    max_timeline_size: usize,
    state: RwLock<TimelineSnapshot>,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TimelineService {
    /// Seeds the timeline from cache and restores the last success time.
    pub async fn open(parts: TimelineParts) -> Self {
        ensure_metrics_described();

        let now = parts.clock.now();
        let events = parts
            .cache
            .read(now)
            .await
            .map(|cached| sort_and_trim(cached, parts.max_timeline_size))
            .unwrap_or_default();
        let last_refresh = parts.cache.read_last_refresh().await;
        info!(
            target: "timeline",
            seeded = events.len(),
            last_refresh = ?last_refresh,
            "timeline opened"
        );
        gauge!("timeline_events").set(events.len() as f64);

        Self {
            concerts: parts.concerts,
            news: parts.news,
            artists: parts.artists,
            cache: parts.cache,
            clock: parts.clock,
            staleness: parts.staleness,
            max_timeline_size: parts.max_timeline_size,
            state: RwLock::new(TimelineSnapshot {
                events,
                last_refresh,
                ..TimelineSnapshot::default()
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Runs a cycle only when the timeline is stale.
    pub async fn load_events(&self) -> CycleOutcome {
        self.run_cycle(false).await
    }

    /// Runs a cycle regardless of staleness. Still refused while one is in flight.
    pub async fn refresh_events(&self) -> CycleOutcome {
        self.run_cycle(true).await
    }

    pub async fn snapshot(&self) -> TimelineSnapshot {
        let mut snap = self.state.read().await.clone();
        snap.is_loading = self.is_in_flight();
        snap
    }

    pub async fn is_stale(&self) -> bool {
        let last = self.state.read().await.last_refresh;
        self.staleness.is_stale(last, self.clock.now())
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Drops persisted and in-memory state; the next `load_events` runs a cycle.
    /// Refused with `CacheError::Busy` while a cycle is in flight, since that
    /// cycle would write the cache straight back.
    pub async fn clear_all_caches(&self) -> Result<(), CacheError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(target: "timeline", "cache clear refused, cycle in flight");
            return Err(CacheError::Busy);
        };
        let res = self.cache.clear().await;
        {
            let mut st = self.state.write().await;
            st.events.clear();
            st.last_refresh = None;
            st.last_error = None;
            st.warning = None;
            st.has_partial_data = false;
        }
        gauge!("timeline_events").set(0.0);
        info!(target: "timeline", ok = res.is_ok(), "caches cleared");
        res
    }

    async fn run_cycle(&self, force: bool) -> CycleOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(target: "timeline", force, "cycle already in flight");
            counter!("timeline_cycles_skipped_total", "reason" => "in_flight").increment(1);
            return CycleOutcome::Skipped(SkipReason::InFlight);
        };

        let now = self.clock.now();
        if !force && !self.is_stale_at(now).await {
            counter!("timeline_cycles_skipped_total", "reason" => "fresh").increment(1);
            return CycleOutcome::Skipped(SkipReason::Fresh);
        }

        {
            let mut st = self.state.write().await;
            st.warning = None;
            st.has_partial_data = false;
        }

        let artists = self.artists.resolve().await;
        let (concerts, news) = tokio::join!(
            self.concerts.fetch(&artists, now),
            self.news.fetch(&artists, now)
        );
        info!(
            target: "timeline",
            artists = artists.len(),
            concerts = concerts.label(),
            news = news.label(),
            force,
            "sources answered"
        );

        let outcome = match merge(concerts, news, !artists.is_empty(), self.max_timeline_size) {
            AggregateOutcome::Updated {
                events,
                partial,
                notice,
            } => self.publish(events, partial, notice, now).await,
            AggregateOutcome::TotalFailure(error) => self.fall_back(error, now).await,
        };
        counter!("timeline_cycles_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    async fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        let last = self.state.read().await.last_refresh;
        self.staleness.is_stale(last, now)
    }

    async fn publish(
        &self,
        events: Vec<Event>,
        partial: bool,
        notice: Option<Notice>,
        now: DateTime<Utc>,
    ) -> CycleOutcome {
        if let Err(e) = self.cache.write(&events).await {
            warn!(target: "timeline", error = %e, "timeline cache write failed");
        }
        if let Err(e) = self.cache.write_last_refresh(now).await {
            warn!(target: "timeline", error = %e, "refresh timestamp write failed");
        }

        let count = events.len();
        {
            let mut st = self.state.write().await;
            st.events = events;
            st.last_error = None;
            st.has_partial_data = partial;
            st.warning = notice.map(|n| n.message().to_string());
            st.last_refresh = Some(now);
        }

        gauge!("timeline_events").set(count as f64);
        gauge!("timeline_last_success_ts").set(now.timestamp() as f64);
        info!(target: "timeline", events = count, partial, "timeline updated");
        CycleOutcome::Updated {
            events: count,
            partial,
        }
    }

    async fn fall_back(&self, error: TimelineError, now: DateTime<Utc>) -> CycleOutcome {
        warn!(
            target: "timeline",
            reason = error.failure_reason(),
            details = ?error.details(),
            "both sources failed"
        );
        let cached = self
            .cache
            .read(now)
            .await
            .map(|events| sort_and_trim(events, self.max_timeline_size));

        let mut st = self.state.write().await;
        st.has_partial_data = false;
        st.last_error = Some(error.to_string());

        match cached {
            Some(events) => {
                let cached = events.len();
                st.events = events;
                st.warning = Some(Notice::cached().message().to_string());
                gauge!("timeline_events").set(cached as f64);
                info!(target: "timeline", cached, "showing cached timeline");
                CycleOutcome::FellBackToCache { cached, error }
            }
            None => CycleOutcome::Failed { error },
        }
    }
}
