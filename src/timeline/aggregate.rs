// src/timeline/aggregate.rs
//! Pure merge of the two per-source results into one cycle outcome.

use std::collections::HashSet;

use crate::error::TimelineError;
use crate::event::Event;
use crate::source_result::SourceResult;

pub const DEFAULT_MAX_TIMELINE_SIZE: usize = 100;

const NOTICE_SEPARATOR: &str = " • ";

pub const NEWS_UNAVAILABLE: &str = "Concert events loaded • News updates temporarily unavailable";
pub const CONCERTS_UNAVAILABLE: &str =
    "News updates loaded • Concert events temporarily unavailable";
pub const NO_CONCERTS_FOUND: &str = "No concerts found for your selected artists";
pub const NO_RECENT_NEWS: &str = "No recent news updates";
pub const SHOWING_CACHED: &str = "Showing cached events from your last update";

/// User-facing warning attached to a published timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// One source has content, the other has none to add.
    Partial(String),
    /// A source found nothing for the current artist filter.
    NoMatches(String),
    /// Both failed; cached items are shown instead.
    Cached(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Partial(m) | Notice::NoMatches(m) | Notice::Cached(m) => m,
        }
    }

    pub fn cached() -> Self {
        Notice::Cached(SHOWING_CACHED.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutcome {
    Updated {
        events: Vec<Event>,
        partial: bool,
        notice: Option<Notice>,
    },
    TotalFailure(TimelineError),
}

pub fn merge(
    concerts: SourceResult<Vec<Event>>,
    news: SourceResult<Vec<Event>>,
    artists_selected: bool,
    max_size: usize,
) -> AggregateOutcome {
    let (concerts, news) = match (concerts, news) {
        (SourceResult::Failed(concerts), SourceResult::Failed(news)) => {
            return AggregateOutcome::TotalFailure(TimelineError::BothSourcesFailed {
                news,
                concerts,
            })
        }
        pair => pair,
    };

    // An empty feed is not a filter result, so it counts as news being unavailable.
    let notice = if concerts.has_content() && !news.has_content() {
        Some(Notice::Partial(NEWS_UNAVAILABLE.to_string()))
    } else if news.has_content() && concerts.is_failed() {
        Some(Notice::Partial(CONCERTS_UNAVAILABLE.to_string()))
    } else {
        let mut soft = Vec::new();
        if matches!(concerts, SourceResult::Empty) && artists_selected {
            soft.push(NO_CONCERTS_FOUND);
        }
        if matches!(news, SourceResult::Empty) {
            soft.push(NO_RECENT_NEWS);
        }
        (!soft.is_empty()).then(|| Notice::NoMatches(soft.join(NOTICE_SEPARATOR)))
    };
    let partial = matches!(notice, Some(Notice::Partial(_)));

    let mut events = concerts.into_data().unwrap_or_default();
    events.extend(news.into_data().unwrap_or_default());

    AggregateOutcome::Updated {
        events: sort_and_trim(events, max_size),
        partial,
        notice,
    }
}

/// Most recent first (stable), one event per id, at most `max_size`.
pub fn sort_and_trim(mut events: Vec<Event>, max_size: usize) -> Vec<Event> {
    events.sort_by(|a, b| b.ordering_key().cmp(&a.ordering_key()));
    let mut seen = HashSet::with_capacity(events.len());
    events.retain(|e| seen.insert(e.id.clone()));
    events.truncate(max_size);
    events
}
