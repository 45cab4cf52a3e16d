// src/ingest/providers/http_feed.rs
use async_trait::async_trait;
use metrics::counter;

use crate::error::ProviderError;
use crate::ingest::types::FeedProvider;

/// Plain GET of an RSS document.
#[derive(Clone)]
pub struct HttpFeedProvider {
    client: reqwest::Client,
}

impl HttpFeedProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedProvider for HttpFeedProvider {
    async fn fetch_feed(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, url, "feed http error");
                counter!("ingest_provider_errors_total", "provider" => "feed").increment(1);
                return Err(e.into());
            }
        };

        let status = resp.status();
        if !status.is_success() {
            counter!("ingest_provider_errors_total", "provider" => "feed").increment(1);
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        tracing::debug!(target: "ingest", url, bytes = body.len(), "feed downloaded");
        Ok(body.to_vec())
    }
}
