// tests/fetchers.rs
use std::sync::Arc;

use artist_timeline::error::{ProviderError, SourceError};
use artist_timeline::ingest::fetchers::{ConcertFetcher, NewsFetcher};
use artist_timeline::testing::{default_normalizer, outlet, show, MockConcertProvider, MockFeedProvider};
use artist_timeline::SourceResult;
use chrono::Utc;

const SOOMPI_XML: &str = include_str!("fixtures/soompi_rss.xml");
const BROKEN_XML: &str = include_str!("fixtures/broken_rss.xml");

fn artists() -> Vec<String> {
    vec!["BTS".into(), "IU".into()]
}

#[tokio::test]
async fn concert_fetch_skips_provider_without_artists() {
    let provider = Arc::new(MockConcertProvider::returning(vec![show("1", "IU", "2024-09-21")]));
    let fetcher = ConcertFetcher::new(provider.clone(), default_normalizer());

    let res = fetcher.fetch(&[], Utc::now()).await;
    assert_eq!(res, SourceResult::Empty);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn concert_fetch_maps_provider_errors() {
    let provider = Arc::new(MockConcertProvider::failing(ProviderError::Unauthorized));
    let fetcher = ConcertFetcher::new(provider.clone(), default_normalizer());
    assert_eq!(
        fetcher.fetch(&artists(), Utc::now()).await,
        SourceResult::Failed(SourceError::AuthenticationRequired)
    );

    provider.set_response(Err(ProviderError::NoData)).await;
    assert_eq!(fetcher.fetch(&artists(), Utc::now()).await, SourceResult::Empty);

    provider.set_response(Err(ProviderError::Status(503))).await;
    assert_eq!(
        fetcher.fetch(&artists(), Utc::now()).await,
        SourceResult::Failed(SourceError::Provider(ProviderError::Status(503)))
    );

    provider.set_response(Ok(vec![])).await;
    assert_eq!(fetcher.fetch(&artists(), Utc::now()).await, SourceResult::Empty);
}

#[tokio::test]
async fn concert_fetch_normalizes_records() {
    let provider = Arc::new(MockConcertProvider::returning(vec![
        show("1", "IU", "2024-09-21"),
        show("2", "BTS", "2024-10-01"),
    ]));
    let fetcher = ConcertFetcher::new(provider, default_normalizer());
    let res = fetcher.fetch(&artists(), Utc::now()).await;
    assert_eq!(res.data().map(Vec::len), Some(2));
}

#[tokio::test]
async fn news_fetch_survives_one_bad_outlet() {
    let feeds = Arc::new(MockFeedProvider::new());
    let good = outlet("Soompi");
    let bad = outlet("Broken");
    feeds.set_feed(&good.url, SOOMPI_XML).await;
    feeds.set_feed(&bad.url, BROKEN_XML).await;

    let fetcher = NewsFetcher::new(feeds.clone(), vec![good, bad], default_normalizer());
    let res = fetcher.fetch(&artists(), Utc::now()).await;
    assert_eq!(res.data().map(Vec::len), Some(2));
    assert_eq!(feeds.calls(), 2);
}

#[tokio::test]
async fn news_fetch_all_offline_is_network_unavailable() {
    let feeds = Arc::new(MockFeedProvider::new());
    let a = outlet("Soompi");
    let b = outlet("Allkpop");
    feeds
        .set_error(&a.url, ProviderError::Connectivity("dns".into()))
        .await;
    feeds.set_error(&b.url, ProviderError::Status(500)).await;

    let fetcher = NewsFetcher::new(feeds, vec![a, b], default_normalizer());
    assert_eq!(
        fetcher.fetch(&artists(), Utc::now()).await,
        SourceResult::Failed(SourceError::NetworkUnavailable)
    );
}

#[tokio::test]
async fn news_fetch_parse_failure_surfaces_as_parse_error() {
    let feeds = Arc::new(MockFeedProvider::new());
    let only = outlet("Broken");
    feeds.set_feed(&only.url, BROKEN_XML).await;

    let fetcher = NewsFetcher::new(feeds, vec![only], default_normalizer());
    let res = fetcher.fetch(&artists(), Utc::now()).await;
    assert!(matches!(res, SourceResult::Failed(SourceError::Parse(_))), "got {res:?}");
}

#[tokio::test]
async fn news_fetch_answered_without_items_is_empty() {
    let feeds = Arc::new(MockFeedProvider::new());
    let only = outlet("Quiet");
    feeds
        .set_feed(&only.url, "<rss><channel><title>Quiet</title></channel></rss>")
        .await;

    let fetcher = NewsFetcher::new(feeds, vec![only], default_normalizer());
    assert_eq!(fetcher.fetch(&artists(), Utc::now()).await, SourceResult::Empty);
}
