// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod error;
pub mod event;
pub mod ingest;
pub mod metrics;
pub mod source_result;
pub mod testing;
pub mod timeline;

pub use crate::api::create_router;
pub use crate::config::TimelineConfig;
pub use crate::event::{Event, EventCategory, EventSource, SourceKind};
pub use crate::source_result::SourceResult;
pub use crate::timeline::{spawn_scheduler, CycleOutcome, TimelineService, TimelineSnapshot};

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::analyze::{FuzzyArtistMatcher, KeywordClassifier};
use crate::ingest::fetchers::{ConcertFetcher, NewsFetcher};
use crate::ingest::normalize::Normalizer;
use crate::ingest::providers::{
    build_client, HttpArtistProvider, HttpConcertProvider, HttpFeedProvider, NoArtistProvider,
    UnconfiguredConcertProvider,
};
use crate::ingest::types::{ArtistProvider, ConcertProvider};
use crate::timeline::{
    ArtistResolver, EventCache, FileStore, Staleness, SystemClock, TimelineParts,
};

/// `RUST_LOG` filter (default `artist_timeline=info,warn`); `LOG_FORMAT=json` for JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("artist_timeline=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        // Already initialised (tests, embedding).
        tracing::debug!("tracing subscriber already set");
    }
}

/// Wires HTTP providers, the file-backed cache and the analysis defaults.
pub async fn build_service(cfg: &TimelineConfig) -> anyhow::Result<Arc<TimelineService>> {
    let client = build_client(cfg.http_timeout()).context("building http client")?;

    let concerts: Arc<dyn ConcertProvider> = match &cfg.concerts.endpoint {
        Some(endpoint) => Arc::new(
            HttpConcertProvider::new(client.clone(), endpoint.clone())
                .with_api_key(cfg.concerts.api_key.clone())
                .with_limit(cfg.concerts.limit)
                .with_location(cfg.concerts.location.clone())
                .with_name(cfg.concerts.name.clone()),
        ),
        None => {
            tracing::warn!("no concerts endpoint configured; concert source will report unavailable");
            Arc::new(UnconfiguredConcertProvider)
        }
    };
    let artist_provider: Arc<dyn ArtistProvider> = match &cfg.artists.endpoint {
        Some(endpoint) => Arc::new(HttpArtistProvider::new(client.clone(), endpoint.clone())),
        None => Arc::new(NoArtistProvider),
    };

    let store = FileStore::open(&cfg.state_dir)
        .await
        .with_context(|| format!("opening state dir {}", cfg.state_dir.display()))?;
    let cache = EventCache::new(Arc::new(store))
        .with_freshness(chrono::Duration::days(cfg.cache.freshness_days.max(1)));

    let normalizer = Arc::new(
        Normalizer::new(
            Arc::new(KeywordClassifier::new()),
            Arc::new(FuzzyArtistMatcher::with_threshold(cfg.news.match_threshold)),
        )
        .with_summary_max_chars(cfg.news.summary_max_chars),
    );

    let parts = TimelineParts {
        concerts: ConcertFetcher::new(concerts, normalizer.clone()),
        news: NewsFetcher::new(
            Arc::new(HttpFeedProvider::new(client)),
            cfg.news.outlets.clone(),
            normalizer,
        ),
        artists: ArtistResolver::new(artist_provider, cache.clone(), cfg.artists.defaults.clone()),
        cache,
        clock: Arc::new(SystemClock),
        staleness: Staleness::from_secs(cfg.refresh.staleness_secs),
        max_timeline_size: cfg.cache.max_timeline_size,
    };

    let service = TimelineService::open(parts).await;
    info!(
        outlets = cfg.news.outlets.len(),
        state_dir = %cfg.state_dir.display(),
        "timeline service ready"
    );
    Ok(Arc::new(service))
}
