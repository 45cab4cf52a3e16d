//! Per-source "safe" fetchers. Each one answers with a [`SourceResult`] and
//! never lets an error escape, so one outage cannot block the other source.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use metrics::counter;
use tracing::{debug, info, warn};

use crate::error::{FeedParseError, ProviderError, SourceError};
use crate::event::Event;
use crate::ingest::feed_parser::parse_feed;
use crate::ingest::normalize::Normalizer;
use crate::ingest::types::{ConcertProvider, FeedOutlet, FeedProvider};
use crate::source_result::SourceResult;

pub struct ConcertFetcher {
    provider: Arc<dyn ConcertProvider>,
    normalizer: Arc<Normalizer>,
}

impl ConcertFetcher {
    pub fn new(provider: Arc<dyn ConcertProvider>, normalizer: Arc<Normalizer>) -> Self {
        Self {
            provider,
            normalizer,
        }
    }

    pub async fn fetch(&self, artists: &[String], now: DateTime<Utc>) -> SourceResult<Vec<Event>> {
        if artists.is_empty() {
            info!(target: "ingest", "no artists selected, skipping concert search");
            return SourceResult::Empty;
        }

        let provider = self.provider.name();
        match self.provider.upcoming_shows(artists).await {
            Ok(records) => {
                let events: Vec<Event> = records
                    .iter()
                    .filter_map(|r| self.normalizer.normalize_show(r, provider, artists, now))
                    .collect();
                debug!(target: "ingest", provider, records = records.len(), kept = events.len(), "concerts normalized");
                SourceResult::from_items(events)
            }
            Err(ProviderError::NoData) => {
                debug!(target: "ingest", provider, "concert provider reported no data");
                SourceResult::Empty
            }
            Err(ProviderError::Unauthorized) => {
                warn!(target: "ingest", provider, "concert provider rejected credentials");
                record_failure("concerts", &SourceError::AuthenticationRequired)
            }
            Err(e) => {
                warn!(target: "ingest", provider, error = %e, "concert fetch failed");
                record_failure("concerts", &SourceError::Provider(e))
            }
        }
    }
}

pub struct NewsFetcher {
    provider: Arc<dyn FeedProvider>,
    outlets: Vec<FeedOutlet>,
    normalizer: Arc<Normalizer>,
}

impl NewsFetcher {
    pub fn new(
        provider: Arc<dyn FeedProvider>,
        outlets: Vec<FeedOutlet>,
        normalizer: Arc<Normalizer>,
    ) -> Self {
        Self {
            provider,
            outlets,
            normalizer,
        }
    }

    pub fn outlets(&self) -> &[FeedOutlet] {
        &self.outlets
    }

    /// Fetches every outlet concurrently. Any outlet answering makes the source answered.
    pub async fn fetch(&self, artists: &[String], now: DateTime<Utc>) -> SourceResult<Vec<Event>> {
        let results = join_all(
            self.outlets
                .iter()
                .map(|outlet| self.fetch_outlet(outlet, artists, now)),
        )
        .await;

        let mut events = Vec::new();
        let mut answered = false;
        let mut failures = Vec::new();
        for (outlet, res) in self.outlets.iter().zip(results) {
            match res {
                Ok(mut evs) => {
                    debug!(target: "ingest", outlet = %outlet.name, items = evs.len(), "feed normalized");
                    answered = true;
                    events.append(&mut evs);
                }
                Err(e) => {
                    warn!(target: "ingest", outlet = %outlet.name, error = %e, "feed fetch failed");
                    failures.push(e);
                }
            }
        }

        if answered || failures.is_empty() {
            return SourceResult::from_items(events);
        }

        let err = if failures
            .iter()
            .any(|e| matches!(e, SourceError::NetworkUnavailable))
        {
            SourceError::NetworkUnavailable
        } else {
            failures.swap_remove(0)
        };
        record_failure("news", &err)
    }

    async fn fetch_outlet(
        &self,
        outlet: &FeedOutlet,
        artists: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, SourceError> {
        let bytes = self
            .provider
            .fetch_feed(&outlet.url)
            .await
            .map_err(|e| {
                if e.is_connectivity() {
                    SourceError::NetworkUnavailable
                } else {
                    SourceError::Provider(e)
                }
            })?;

        // Parsing is CPU work; keep it off the async workers.
        let items = tokio::task::spawn_blocking(move || parse_feed(&bytes))
            .await
            .map_err(|e| FeedParseError::Interrupted(e.to_string()))??;

        Ok(items
            .iter()
            .filter_map(|item| {
                self.normalizer
                    .normalize_feed_item(item, &outlet.name, artists, now)
            })
            .collect())
    }
}

fn record_failure(source: &'static str, err: &SourceError) -> SourceResult<Vec<Event>> {
    counter!("timeline_source_failures_total", "source" => source, "kind" => err.kind())
        .increment(1);
    SourceResult::Failed(err.clone())
}
