// src/timeline/artists.rs
use std::sync::Arc;

use tracing::{debug, warn};

use crate::ingest::types::ArtistProvider;
use crate::timeline::cache::EventCache;

pub const DEFAULT_ARTISTS: &[&str] = &[
    "BTS",
    "BLACKPINK",
    "NewJeans",
    "TWICE",
    "SEVENTEEN",
    "Stray Kids",
];

/// Decides which artists scope a cycle: provider, then last cached list, then defaults.
pub struct ArtistResolver {
    provider: Arc<dyn ArtistProvider>,
    cache: EventCache,
    defaults: Vec<String>,
}

impl ArtistResolver {
    pub fn new(provider: Arc<dyn ArtistProvider>, cache: EventCache, defaults: Vec<String>) -> Self {
        Self {
            provider,
            cache,
            defaults,
        }
    }

    pub async fn resolve(&self) -> Vec<String> {
        match self.provider.followed_artists().await {
            Ok(artists) if !artists.is_empty() => {
                if let Err(e) = self.cache.write_artists(&artists).await {
                    warn!(target: "timeline", error = %e, "caching artist list failed");
                }
                debug!(target: "timeline", count = artists.len(), "artists from provider");
                return artists;
            }
            Ok(_) => debug!(target: "timeline", "provider returned no artists"),
            Err(e) => warn!(target: "timeline", error = %e, "artist provider failed"),
        }

        if let Some(cached) = self.cache.read_artists().await {
            debug!(target: "timeline", count = cached.len(), "artists from cache");
            return cached;
        }
        debug!(target: "timeline", count = self.defaults.len(), "artists from defaults");
        self.defaults.clone()
    }
}

pub fn default_artists() -> Vec<String> {
    DEFAULT_ARTISTS.iter().map(|s| s.to_string()).collect()
}
