// src/ingest/types.rs
use crate::error::ProviderError;
use serde::{Deserialize, Serialize};

/// One `<item>` as read off the wire. Consumed only by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedItem {
    pub title: String, // "" when the feed omitted <title>
    pub description: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
    pub guid: Option<String>,
    pub enclosure: Option<Enclosure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enclosure {
    pub url: Option<String>,
    pub media_type: Option<String>,
}

/// Ticketing record as returned by the concert provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub venue: String,
    pub city: String,
    #[serde(default)]
    pub date: Option<String>, // yyyy-MM-dd
    #[serde(default)]
    pub time: Option<String>, // HH:mm:ss
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    pub currency: String,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A news outlet: display name + feed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedOutlet {
    pub name: String,
    pub url: String,
}

#[async_trait::async_trait]
pub trait ConcertProvider: Send + Sync {
    async fn upcoming_shows(&self, artists: &[String]) -> Result<Vec<ShowRecord>, ProviderError>;
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    /// Raw document bytes for one feed URL.
    async fn fetch_feed(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

#[async_trait::async_trait]
pub trait ArtistProvider: Send + Sync {
    /// Names of the artists the current user follows. May be empty.
    async fn followed_artists(&self) -> Result<Vec<String>, ProviderError>;
}
