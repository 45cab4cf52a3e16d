//! Test doubles for the collaborator traits, plus a settable clock.
//!
//! Used by the unit tests and the integration tests under `tests/`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Notify, RwLock};

use crate::analyze::{FuzzyArtistMatcher, KeywordClassifier};
use crate::error::ProviderError;
use crate::ingest::fetchers::{ConcertFetcher, NewsFetcher};
use crate::ingest::normalize::Normalizer;
use crate::ingest::types::{ArtistProvider, ConcertProvider, FeedOutlet, FeedProvider, ShowRecord};
use crate::timeline::aggregate::DEFAULT_MAX_TIMELINE_SIZE;
use crate::timeline::artists::ArtistResolver;
use crate::timeline::cache::EventCache;
use crate::timeline::clock::Clock;
use crate::timeline::scheduler::Staleness;
use crate::timeline::service::TimelineParts;
use crate::timeline::store::KeyValueStore;

/// Concert provider with a scripted answer. Optionally parks each call on a gate.
#[derive(Debug)]
pub struct MockConcertProvider {
    response: RwLock<Result<Vec<ShowRecord>, ProviderError>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl MockConcertProvider {
    pub fn returning(records: Vec<ShowRecord>) -> Self {
        Self {
            response: RwLock::new(Ok(records)),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            response: RwLock::new(Err(err)),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Each call waits for one `notify_one()` on `gate` before answering.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub async fn set_response(&self, response: Result<Vec<ShowRecord>, ProviderError>) {
        *self.response.write().await = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConcertProvider for MockConcertProvider {
    async fn upcoming_shows(&self, _artists: &[String]) -> Result<Vec<ShowRecord>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.response.read().await.clone()
    }

    fn name(&self) -> &str {
        "MockTickets"
    }
}

/// Feed provider serving documents from a map; unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct MockFeedProvider {
    feeds: RwLock<HashMap<String, Result<Vec<u8>, ProviderError>>>,
    calls: AtomicUsize,
}

impl MockFeedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_feed(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.feeds
            .write()
            .await
            .insert(url.to_string(), Ok(body.into()));
    }

    pub async fn set_error(&self, url: &str, err: ProviderError) {
        self.feeds.write().await.insert(url.to_string(), Err(err));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedProvider for MockFeedProvider {
    async fn fetch_feed(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.feeds
            .read()
            .await
            .get(url)
            .cloned()
            .unwrap_or(Err(ProviderError::Status(404)))
    }
}

#[derive(Debug)]
pub struct MockArtistProvider {
    response: RwLock<Result<Vec<String>, ProviderError>>,
}

impl MockArtistProvider {
    pub fn returning(artists: &[&str]) -> Self {
        Self {
            response: RwLock::new(Ok(artists.iter().map(|a| a.to_string()).collect())),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            response: RwLock::new(Err(err)),
        }
    }

    pub async fn set_response(&self, response: Result<Vec<String>, ProviderError>) {
        *self.response.write().await = response;
    }
}

#[async_trait]
impl ArtistProvider for MockArtistProvider {
    async fn followed_artists(&self) -> Result<Vec<String>, ProviderError> {
        self.response.read().await.clone()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

pub fn default_normalizer() -> Arc<Normalizer> {
    Arc::new(Normalizer::new(
        Arc::new(KeywordClassifier::new()),
        Arc::new(FuzzyArtistMatcher::default()),
    ))
}

/// Service wiring with default analysis, staleness and size limits.
pub fn timeline_parts(
    concerts: Arc<dyn ConcertProvider>,
    feeds: Arc<dyn FeedProvider>,
    outlets: Vec<FeedOutlet>,
    artists: Arc<dyn ArtistProvider>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
) -> TimelineParts {
    let normalizer = default_normalizer();
    let cache = EventCache::new(store);
    TimelineParts {
        concerts: ConcertFetcher::new(concerts, normalizer.clone()),
        news: NewsFetcher::new(feeds, outlets, normalizer),
        artists: ArtistResolver::new(artists, cache.clone(), Vec::new()),
        cache,
        clock,
        staleness: Staleness::default(),
        max_timeline_size: DEFAULT_MAX_TIMELINE_SIZE,
    }
}

pub fn show(id: &str, artist: &str, date: &str) -> ShowRecord {
    ShowRecord {
        id: id.to_string(),
        name: format!("{artist} World Tour"),
        artist: artist.to_string(),
        venue: "KSPO Dome".to_string(),
        city: "Seoul".to_string(),
        date: Some(date.to_string()),
        time: Some("19:00:00".to_string()),
        min_price: Some(99.0),
        max_price: Some(250.0),
        currency: "USD".to_string(),
        url: format!("https://tickets.example/{id}"),
        image_url: None,
    }
}

pub fn outlet(name: &str) -> FeedOutlet {
    FeedOutlet {
        name: name.to_string(),
        url: format!("https://{}.example/feed", name.to_lowercase()),
    }
}
