// src/timeline/cache.rs
//! Last good timeline plus the bookkeeping entries derived from it.
//!
//! Freshness is applied on read only; writes always store the full list.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::event::Event;
use crate::timeline::store::KeyValueStore;

pub const CACHED_EVENTS_KEY: &str = "cached_events";
pub const CACHED_ARTISTS_KEY: &str = "cached_selected_artists";
pub const LAST_REFRESH_KEY: &str = "last_event_refresh";

pub const DEFAULT_FRESHNESS_DAYS: i64 = 7;

#[derive(Clone)]
pub struct EventCache {
    store: Arc<dyn KeyValueStore>,
    freshness: Duration,
}

impl EventCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            freshness: Duration::days(DEFAULT_FRESHNESS_DAYS),
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub async fn write(&self, events: &[Event]) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(events)?;
        self.store.set(CACHED_EVENTS_KEY, bytes).await?;
        debug!(target: "timeline", events = events.len(), "timeline cached");
        Ok(())
    }

    /// Fresh cached events, or `None`. Never `Some(vec![])`.
    pub async fn read(&self, now: DateTime<Utc>) -> Option<Vec<Event>> {
        let bytes = match self.store.get(CACHED_EVENTS_KEY).await {
            Ok(Some(b)) => b,
            Ok(None) => return None,
            Err(e) => {
                warn!(target: "timeline", error = %e, "cache read failed");
                return None;
            }
        };
        let events: Vec<Event> = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => {
                warn!(target: "timeline", error = %e, "cached timeline unreadable");
                return None;
            }
        };

        let cutoff = now - self.freshness;
        let total = events.len();
        let fresh: Vec<Event> = events
            .into_iter()
            .filter(|e| e.ordering_key() > cutoff)
            .collect();
        debug!(target: "timeline", total, fresh = fresh.len(), "cache read");
        if fresh.is_empty() {
            None
        } else {
            Some(fresh)
        }
    }

    /// Drops the timeline and everything derived from it. Attempts every key.
    pub async fn clear(&self) -> Result<(), CacheError> {
        let mut first_err = None;
        for key in [CACHED_EVENTS_KEY, CACHED_ARTISTS_KEY, LAST_REFRESH_KEY] {
            if let Err(e) = self.store.remove(key).await {
                warn!(target: "timeline", key, error = %e, "cache clear failed");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    pub async fn read_last_refresh(&self) -> Option<DateTime<Utc>> {
        let bytes = self.store.get(LAST_REFRESH_KEY).await.ok().flatten()?;
        let raw = String::from_utf8(bytes).ok()?;
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub async fn write_last_refresh(&self, at: DateTime<Utc>) -> Result<(), CacheError> {
        self.store
            .set(LAST_REFRESH_KEY, at.to_rfc3339().into_bytes())
            .await?;
        Ok(())
    }

    pub async fn read_artists(&self) -> Option<Vec<String>> {
        let bytes = self.store.get(CACHED_ARTISTS_KEY).await.ok().flatten()?;
        serde_json::from_slice::<Vec<String>>(&bytes)
            .ok()
            .filter(|a| !a.is_empty())
    }

    pub async fn write_artists(&self, artists: &[String]) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(artists)?;
        self.store.set(CACHED_ARTISTS_KEY, bytes).await?;
        Ok(())
    }
}
