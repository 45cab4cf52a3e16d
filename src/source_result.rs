//! Tri-state outcome of one source fetch.
//!
//! `Empty` is a confirmed "nothing to show" answer and counts as success for the
//! merge; `Failed` is indeterminate. The distinction is what lets one source's
//! outage stay out of the other's way.

use crate::error::SourceError;

#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult<T> {
    Success(T),
    Empty,
    Failed(SourceError),
}

impl<T> SourceResult<Vec<T>> {
    /// `Empty` for an empty vec, `Success` otherwise. Fetchers build results through this.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            SourceResult::Empty
        } else {
            SourceResult::Success(items)
        }
    }
}

impl<T> SourceResult<T> {
    /// Carries a usable payload.
    pub fn has_content(&self) -> bool {
        matches!(self, SourceResult::Success(_))
    }

    /// Upstream answered (with or without data).
    pub fn is_answered(&self) -> bool {
        !self.is_failed()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SourceResult::Failed(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            SourceResult::Success(d) => Some(d),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SourceError> {
        match self {
            SourceResult::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            SourceResult::Success(d) => Some(d),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceResult::Success(_) => "success",
            SourceResult::Empty => "empty",
            SourceResult::Failed(_) => "failed",
        }
    }
}
