//! Raw feed items / ticketing records → canonical [`Event`]s.
//!
//! Never fails an item for bad metadata: unparseable dates fall back to `now`,
//! malformed URLs become `None`. The only rejection is an empty title.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use metrics::counter;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::analyze::{ArtistMatcher, TextClassifier};
use crate::event::{stable_id, Event, EventCategory, EventSource};
use crate::ingest::types::{RawFeedItem, ShowRecord};
use crate::ingest::{clean_text, truncate_chars};

pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 200;

const FALLBACK_FEED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct Normalizer {
    classifier: Arc<dyn TextClassifier>,
    matcher: Arc<dyn ArtistMatcher>,
    summary_max_chars: usize,
}

impl Normalizer {
    pub fn new(classifier: Arc<dyn TextClassifier>, matcher: Arc<dyn ArtistMatcher>) -> Self {
        Self {
            classifier,
            matcher,
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
        }
    }

    pub fn with_summary_max_chars(mut self, max: usize) -> Self {
        self.summary_max_chars = max;
        self
    }

    pub fn normalize_feed_item(
        &self,
        item: &RawFeedItem,
        outlet: &str,
        artists: &[String],
        now: DateTime<Utc>,
    ) -> Option<Event> {
        let title = clean_text(&item.title);
        if title.is_empty() {
            tracing::trace!(target: "ingest", outlet, "dropping feed item without title");
            counter!("ingest_items_dropped_total").increment(1);
            return None;
        }

        let content = item.description.as_deref().map(clean_text).unwrap_or_default();
        let published = item
            .pub_date
            .as_deref()
            .and_then(parse_feed_date)
            .unwrap_or(now);

        let class = self.classifier.classify(&title, &content, published, now);
        let matched_artists = self
            .matcher
            .find_matches(&format!("{title} {content}"), artists);

        let source = EventSource::news(outlet);
        let key = item
            .guid
            .as_deref()
            .or(item.link.as_deref())
            .unwrap_or(&title);
        let mut ev = Event::new(
            stable_id(&source, key),
            title,
            published,
            class.category,
            source,
        );
        ev.summary = self.summary(&content);
        ev.url = valid_url(item.link.as_deref());
        ev.image_url = valid_url(item.enclosure.as_ref().and_then(|e| e.url.as_deref()));
        ev.is_breaking = class.is_breaking;
        ev.matched_artists = matched_artists;
        Some(ev)
    }

    pub fn normalize_show(
        &self,
        record: &ShowRecord,
        provider: &str,
        artists: &[String],
        now: DateTime<Utc>,
    ) -> Option<Event> {
        let title = clean_text(&record.name);
        if title.is_empty() {
            tracing::trace!(target: "ingest", provider, id = %record.id, "dropping show without name");
            counter!("ingest_items_dropped_total").increment(1);
            return None;
        }

        let matched_artists = self
            .matcher
            .find_matches(&format!("{} {}", record.artist, title), artists);

        let source = EventSource::concert(provider);
        let key = if record.id.trim().is_empty() {
            record.url.as_str()
        } else {
            record.id.as_str()
        };
        let mut ev = Event::new(
            stable_id(&source, key),
            title,
            now,
            EventCategory::Concerts,
            source,
        );
        ev.summary = self.summary(&format!(
            "{} at {}, {}",
            record.artist, record.venue, record.city
        ));
        ev.url = valid_url(Some(&record.url));
        ev.image_url = valid_url(record.image_url.as_deref());
        ev.event_date = parse_show_date(record.date.as_deref(), record.time.as_deref());
        ev.matched_artists = matched_artists;
        ev.venue = non_empty(&record.venue);
        ev.city = non_empty(&record.city);
        ev.min_price = record.min_price;
        ev.max_price = record.max_price;
        ev.currency = non_empty(&record.currency);
        Some(ev)
    }

    fn summary(&self, content: &str) -> Option<String> {
        let s = truncate_chars(content.trim(), self.summary_max_chars);
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }
}

/// Feed publication date: RFC 2822, then RFC 3339, then `%Y-%m-%dT%H:%M:%S` (UTC).
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(odt) = OffsetDateTime::parse(s, &Rfc2822) {
        return DateTime::from_timestamp(odt.unix_timestamp(), odt.nanosecond());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, FALLBACK_FEED_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Show date from separate `yyyy-MM-dd` and `HH:mm[:ss]` strings, read as UTC.
pub fn parse_show_date(date: Option<&str>, time: Option<&str>) -> Option<DateTime<Utc>> {
    let date = date.map(str::trim).filter(|d| !d.is_empty())?;
    match time.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => {
            let combined = format!("{date} {t}");
            NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M"))
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        }
        None => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive)),
    }
}

fn valid_url(raw: Option<&str>) -> Option<String> {
    let s = raw?.trim();
    reqwest::Url::parse(s).ok().map(|_| s.to_string())
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
