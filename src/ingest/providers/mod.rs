// src/ingest/providers/mod.rs
//! HTTP adapters for the collaborator traits in `ingest::types`.

pub mod http_artists;
pub mod http_concerts;
pub mod http_feed;

pub use http_artists::{HttpArtistProvider, NoArtistProvider};
pub use http_concerts::{HttpConcertProvider, UnconfiguredConcertProvider};
pub use http_feed::HttpFeedProvider;

use std::time::Duration;

use crate::error::ProviderError;

/// Shared client builder: one timeout for the whole request.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("artist-timeline/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Connectivity(e.to_string()))
}
