//! Error taxonomy for the timeline pipeline.
//!
//! Three layers:
//! - [`ProviderError`] / [`FeedParseError`]: what a collaborator or the parser reports.
//! - [`SourceError`]: what a fetcher stores inside `SourceResult::Failed`.
//!   Never propagated past the fetcher boundary.
//! - [`TimelineError`]: the composite error surfaced only when both sources fail.

use thiserror::Error;

/// Failure reported by an upstream collaborator (concert API, feed host, artist backend).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Upstream rejected our credentials.
    #[error("upstream rejected credentials")]
    Unauthorized,

    /// Upstream answered but explicitly had nothing for us.
    #[error("upstream returned no data")]
    NoData,

    /// Could not reach the upstream at all (DNS, connect, timeout, dropped connection).
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// Non-success HTTP status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// Body could not be decoded into the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ProviderError::Connectivity(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            return ProviderError::Connectivity(e.to_string());
        }
        if let Some(status) = e.status() {
            return ProviderError::Status(status.as_u16());
        }
        if e.is_decode() || e.is_body() {
            return ProviderError::InvalidResponse(e.to_string());
        }
        // Request/redirect/builder errors: treat as not reaching the host.
        ProviderError::Connectivity(e.to_string())
    }
}

/// Structural failure while parsing a feed document. Aborts the whole document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedParseError {
    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("document ended inside <{0}>")]
    UnexpectedEof(String),

    #[error("document has no root element")]
    NoRootElement,

    #[error("parse task interrupted: {0}")]
    Interrupted(String),
}

/// Per-source failure kept inside `SourceResult::Failed`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Please sign in to view personalized events and updates.")]
    AuthenticationRequired,

    #[error("No internet connection available. Please check your network and try again.")]
    NetworkUnavailable,

    #[error("Failed to parse RSS feed: {0}")]
    Parse(#[from] FeedParseError),

    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl SourceError {
    /// Connectivity and authorization problems are expected to clear up on their own.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SourceError::AuthenticationRequired | SourceError::NetworkUnavailable
        )
    }

    /// Short machine-friendly label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::AuthenticationRequired => "auth",
            SourceError::NetworkUnavailable => "network",
            SourceError::Parse(_) => "parse",
            SourceError::Provider(_) => "provider",
        }
    }
}

/// Cycle-level failure. Only built when neither source produced a usable answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("Unable to load events from any source. Please check your connection and try again.")]
    BothSourcesFailed {
        news: SourceError,
        concerts: SourceError,
    },
}

impl TimelineError {
    /// Non-recoverable for the current cycle only; the next cycle starts clean.
    pub fn is_recoverable(&self) -> bool {
        false
    }

    pub fn failure_reason(&self) -> &'static str {
        match self {
            TimelineError::BothSourcesFailed { .. } => {
                "Both news and concert data sources failed to respond"
            }
        }
    }

    /// Both underlying causes, for logs and diagnostics.
    pub fn details(&self) -> Vec<String> {
        match self {
            TimelineError::BothSourcesFailed { news, concerts } => {
                vec![format!("News: {news}"), format!("Concerts: {concerts}")]
            }
        }
    }
}

/// Key-value persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store key {0:?}")]
    InvalidKey(String),

    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cache read/write failure. Logged by the service, never fatal to a cycle.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cache (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("a refresh cycle is in flight")]
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverability_follows_error_class() {
        assert!(SourceError::AuthenticationRequired.is_recoverable());
        assert!(SourceError::NetworkUnavailable.is_recoverable());
        assert!(!SourceError::Provider(ProviderError::Status(500)).is_recoverable());
        assert!(!SourceError::Parse(FeedParseError::NoRootElement).is_recoverable());
    }

    #[test]
    fn composite_error_carries_both_causes() {
        let err = TimelineError::BothSourcesFailed {
            news: SourceError::NetworkUnavailable,
            concerts: SourceError::AuthenticationRequired,
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().starts_with("Unable to load events"));
        let details = err.details();
        assert_eq!(details.len(), 2);
        assert!(details[0].starts_with("News: No internet connection"));
        assert!(details[1].starts_with("Concerts: Please sign in"));
    }
}
