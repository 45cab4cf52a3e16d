// tests/cache_store.rs
use std::sync::Arc;

use artist_timeline::event::{Event, EventCategory, EventSource};
use artist_timeline::timeline::cache::{EventCache, CACHED_EVENTS_KEY};
use artist_timeline::timeline::store::{FileStore, KeyValueStore};
use chrono::{Duration, Utc};

fn ev(id: &str, age: Duration) -> Event {
    let mut e = Event::new(
        id,
        format!("Event {id}"),
        Utc::now() - age,
        EventCategory::Albums,
        EventSource::news("Soompi"),
    );
    e.matched_artists = vec!["IU".into()];
    e.url = Some(format!("https://soompi.example/{id}"));
    e
}

#[tokio::test]
async fn timeline_survives_reopening_the_state_dir() {
    let dir = tempfile::tempdir().unwrap();
    let written = vec![ev("a", Duration::hours(2)), ev("b", Duration::days(2))];
    let at = Utc::now();
    {
        let cache = EventCache::new(Arc::new(FileStore::open(dir.path()).await.unwrap()));
        cache.write(&written).await.unwrap();
        cache.write_last_refresh(at).await.unwrap();
    }

    let cache = EventCache::new(Arc::new(FileStore::open(dir.path()).await.unwrap()));
    let read = cache.read(Utc::now()).await.expect("fresh entries");
    assert_eq!(read, written);
    assert_eq!(
        cache.read_last_refresh().await.map(|t| t.timestamp_millis()),
        Some(at.timestamp_millis())
    );
}

#[tokio::test]
async fn freshness_window_is_configurable() {
    let dir = tempfile::tempdir().unwrap();
    let cache = EventCache::new(Arc::new(FileStore::open(dir.path()).await.unwrap()))
        .with_freshness(Duration::days(1));
    cache
        .write(&[ev("a", Duration::hours(2)), ev("b", Duration::days(2))])
        .await
        .unwrap();
    let read = cache.read(Utc::now()).await.unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].id, "a");
}

#[tokio::test]
async fn clear_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).await.unwrap());
    let cache = EventCache::new(store.clone());
    cache.write(&[ev("a", Duration::hours(1))]).await.unwrap();
    cache.write_artists(&["IU".to_string()]).await.unwrap();
    cache.write_last_refresh(Utc::now()).await.unwrap();

    cache.clear().await.unwrap();
    assert_eq!(store.get(CACHED_EVENTS_KEY).await.unwrap(), None);
    assert!(cache.read_artists().await.is_none());
    assert!(cache.read_last_refresh().await.is_none());
    // Clearing twice is fine.
    cache.clear().await.unwrap();
}
