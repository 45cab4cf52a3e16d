// src/ingest/providers/http_artists.rs
use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::ProviderError;
use crate::ingest::types::ArtistProvider;

/// GET endpoint returning a JSON array of artist names.
pub struct HttpArtistProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpArtistProvider {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ArtistProvider for HttpArtistProvider {
    async fn followed_artists(&self) -> Result<Vec<String>, ProviderError> {
        let resp = self.client.get(&self.endpoint).send().await?;
        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Unauthorized),
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(Vec::new()),
            s if !s.is_success() => Err(ProviderError::Status(s.as_u16())),
            _ => {
                let names: Vec<String> = resp
                    .json()
                    .await
                    .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
                Ok(names
                    .into_iter()
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .collect())
            }
        }
    }
}

/// Used when no artist endpoint is configured; resolution falls through to cache/defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoArtistProvider;

#[async_trait]
impl ArtistProvider for NoArtistProvider {
    async fn followed_artists(&self) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }
}
