// tests/normalize.rs
use artist_timeline::event::{EventCategory, SourceKind};
use artist_timeline::ingest::feed_parser::parse_feed;
use artist_timeline::ingest::types::RawFeedItem;
use artist_timeline::testing::{default_normalizer, show};
use chrono::{Duration, TimeZone, Utc};

const SOOMPI_XML: &str = include_str!("fixtures/soompi_rss.xml");

fn artists() -> Vec<String> {
    vec!["NewJeans".into(), "BTS".into(), "IU".into()]
}

#[test]
fn fixture_normalizes_and_drops_titleless_item() {
    let now = Utc.with_ymd_and_hms(2024, 6, 4, 1, 0, 0).unwrap();
    let n = default_normalizer();
    let items = parse_feed(SOOMPI_XML.as_bytes()).unwrap();

    let events: Vec<_> = items
        .iter()
        .filter_map(|i| n.normalize_feed_item(i, "Soompi", &artists(), now))
        .collect();
    assert_eq!(events.len(), 2, "titleless item must be dropped");

    let bts = &events[0];
    assert_eq!(bts.category, EventCategory::Concerts);
    assert_eq!(bts.matched_artists, vec!["BTS".to_string()]);
    assert_eq!(bts.source.kind, SourceKind::News);
    assert_eq!(bts.source.name, "Soompi");
    assert_eq!(
        bts.summary.as_deref(),
        Some("BTS will play stadiums across Asia & Europe.")
    );
    assert_eq!(bts.published_date.to_rfc3339(), "2024-06-04T00:15:00+00:00");
    assert_eq!(
        bts.image_url.as_deref(),
        Some("https://img.soompi.example/1001.jpg")
    );

    let nj = &events[1];
    assert_eq!(nj.category, EventCategory::Albums);
    assert_eq!(nj.matched_artists, vec!["NewJeans".to_string()]);
}

#[test]
fn ids_are_stable_across_runs_and_distinct_per_outlet() {
    let now = Utc::now();
    let n = default_normalizer();
    let item = RawFeedItem {
        title: "IU drops a surprise single".into(),
        guid: Some("g-1".into()),
        ..Default::default()
    };
    let a = n.normalize_feed_item(&item, "Soompi", &artists(), now).unwrap();
    let b = n
        .normalize_feed_item(&item, "Soompi", &artists(), now + Duration::hours(1))
        .unwrap();
    let c = n.normalize_feed_item(&item, "Allkpop", &artists(), now).unwrap();
    assert_eq!(a.id, b.id);
    assert_ne!(a.id, c.id);
}

#[test]
fn unparseable_date_falls_back_to_now() {
    let now = Utc.with_ymd_and_hms(2024, 6, 4, 1, 0, 0).unwrap();
    let item = RawFeedItem {
        title: "Some headline".into(),
        pub_date: Some("yesterday-ish".into()),
        link: Some("not a url".into()),
        ..Default::default()
    };
    let ev = default_normalizer()
        .normalize_feed_item(&item, "Soompi", &[], now)
        .unwrap();
    assert_eq!(ev.published_date, now);
    assert_eq!(ev.url, None);
    assert!(ev.matched_artists.is_empty());
    assert_eq!(ev.summary, None);
}

#[test]
fn long_descriptions_are_cut_to_200_chars() {
    let item = RawFeedItem {
        title: "Headline".into(),
        description: Some("word ".repeat(100)),
        ..Default::default()
    };
    let ev = default_normalizer()
        .normalize_feed_item(&item, "Soompi", &[], Utc::now())
        .unwrap();
    assert_eq!(ev.summary.unwrap().chars().count(), 200);
}

#[test]
fn show_records_become_concert_events() {
    let now = Utc.with_ymd_and_hms(2024, 6, 4, 1, 0, 0).unwrap();
    let rec = show("tm-1", "IU", "2024-09-21");
    let ev = default_normalizer()
        .normalize_show(&rec, "MockTickets", &artists(), now)
        .unwrap();

    assert_eq!(ev.category, EventCategory::Concerts);
    assert_eq!(ev.source.kind, SourceKind::Concert);
    assert_eq!(ev.published_date, now);
    assert_eq!(
        ev.event_date.unwrap().to_rfc3339(),
        "2024-09-21T19:00:00+00:00"
    );
    assert_eq!(ev.summary.as_deref(), Some("IU at KSPO Dome, Seoul"));
    assert_eq!(ev.matched_artists, vec!["IU".to_string()]);
    assert_eq!(ev.min_price, Some(99.0));
    assert_eq!(ev.max_price, Some(250.0));
    assert_eq!(ev.currency.as_deref(), Some("USD"));
    assert_eq!(ev.ordering_key(), ev.event_date.unwrap());
}
