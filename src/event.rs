//! Canonical timeline entry shared by both sources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Concerts,
    Albums,
    Merch,
    FanEvents,
    Subscriptions,
    Other,
}

impl EventCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            EventCategory::Concerts => "Concerts & Shows",
            EventCategory::Albums => "Albums & Photocards",
            EventCategory::Merch => "Official Merch",
            EventCategory::FanEvents => "Fan Events (KCON, Hi-Touch)",
            EventCategory::Subscriptions => "Subscriptions & Fan Apps",
            EventCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Concert,
    News,
}

/// Where an event came from: which half of the timeline, and which outlet/provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventSource {
    pub kind: SourceKind,
    pub name: String,
}

impl EventSource {
    pub fn news(outlet: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::News,
            name: outlet.into(),
        }
    }

    pub fn concert(provider: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Concert,
            name: provider.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub published_date: DateTime<Utc>,
    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,
    pub category: EventCategory,
    #[serde(default)]
    pub is_breaking: bool,
    #[serde(default)]
    pub matched_artists: Vec<String>,
    pub source: EventSource,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl Event {
    /// Minimal news-style event; remaining fields can be set on the returned value.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        published_date: DateTime<Utc>,
        category: EventCategory,
        source: EventSource,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: None,
            url: None,
            image_url: None,
            published_date,
            event_date: None,
            category,
            is_breaking: false,
            matched_artists: Vec::new(),
            source,
            venue: None,
            city: None,
            min_price: None,
            max_price: None,
            currency: None,
        }
    }

    /// Timeline ordering key: the show date when there is one, else publication time.
    pub fn ordering_key(&self) -> DateTime<Utc> {
        self.event_date.unwrap_or(self.published_date)
    }
}

/// Stable id: first 12 bytes of SHA-256 over the source identity and the item's
/// most specific key (guid, link or title), hex encoded.
pub fn stable_id(source: &EventSource, key: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let mut hasher = Sha256::new();
    hasher.update(match source.kind {
        SourceKind::Concert => b"concert:".as_slice(),
        SourceKind::News => b"news:".as_slice(),
    });
    hasher.update(source.name.as_bytes());
    hasher.update(b"\n");
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(24);
    for b in digest.iter().take(12) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
