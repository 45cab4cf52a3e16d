// src/ingest/providers/http_concerts.rs
use async_trait::async_trait;
use metrics::counter;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::ingest::types::{ConcertProvider, ShowRecord};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    genres: [&'a str; 1],
    artists: &'a [String],
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
}

/// The search endpoint answers either `{"shows": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped { shows: Vec<ShowRecord> },
    Bare(Vec<ShowRecord>),
}

impl SearchResponse {
    fn into_shows(self) -> Vec<ShowRecord> {
        match self {
            SearchResponse::Wrapped { shows } => shows,
            SearchResponse::Bare(shows) => shows,
        }
    }
}

/// Ticketing search API: POST JSON, bearer key.
pub struct HttpConcertProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    limit: u32,
    location: Option<String>,
    name: String,
}

impl HttpConcertProvider {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
            limit: 50,
            location: None,
            name: "Concerts".to_string(),
        }
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl ConcertProvider for HttpConcertProvider {
    async fn upcoming_shows(&self, artists: &[String]) -> Result<Vec<ShowRecord>, ProviderError> {
        // No key means the request can only be rejected.
        let Some(key) = self.api_key.as_deref() else {
            return Err(ProviderError::Unauthorized);
        };

        let body = SearchRequest {
            genres: ["music"],
            artists,
            limit: self.limit,
            location: self.location.as_deref(),
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| {
                tracing::warn!(target: "ingest", error = ?e, provider = %self.name, "concert http error");
                counter!("ingest_provider_errors_total", "provider" => "concerts").increment(1);
            })?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ProviderError::Unauthorized)
            }
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => return Err(ProviderError::NoData),
            s if !s.is_success() => {
                counter!("ingest_provider_errors_total", "provider" => "concerts").increment(1);
                return Err(ProviderError::Status(s.as_u16()));
            }
            _ => {}
        }

        let parsed: SearchResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(parsed.into_shows())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Stand-in when no search endpoint is configured: every call is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredConcertProvider;

#[async_trait]
impl ConcertProvider for UnconfiguredConcertProvider {
    async fn upcoming_shows(&self, _artists: &[String]) -> Result<Vec<ShowRecord>, ProviderError> {
        Err(ProviderError::Unauthorized)
    }

    fn name(&self) -> &str {
        "Concerts"
    }
}
