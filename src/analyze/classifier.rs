// src/analyze/classifier.rs
//! Keyword classifier: weighted keyword hits per category plus a recency-scaled
//! "breaking" score.
//!
//! - Each category keyword adds its weight when present in title+content,
//!   and half of it again when it is in the title.
//! - More than one distinct hit in a category adds 0.5 per extra hit.
//! - Small context nudges: price mentions lean merch/concerts,
//!   online/digital mentions lean subscriptions.
//! - Best score must exceed [`CATEGORY_MIN_SCORE`], else `Other`.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use crate::event::EventCategory;

pub const CATEGORY_MIN_SCORE: f64 = 1.0;
pub const BREAKING_MIN_SCORE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: EventCategory,
    pub is_breaking: bool,
}

pub trait TextClassifier: Send + Sync {
    fn classify(
        &self,
        title: &str,
        content: &str,
        published: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Classification;
}

type Weighted = &'static [(&'static str, f64)];

const CONCERTS: Weighted = &[
    ("world tour", 4.0),
    ("tour", 3.5),
    ("concert", 3.5),
    ("presale", 3.0),
    ("stadium", 3.0),
    ("showcase", 2.5),
    ("tickets", 2.5),
    ("festival", 2.5),
    ("arena", 2.5),
    ("sold out", 2.5),
    ("encore", 2.0),
    ("setlist", 2.0),
    ("venue", 2.0),
    ("live", 2.0),
    ("performance", 2.0),
];

const ALBUMS: Weighted = &[
    ("mini album", 3.5),
    ("comeback", 3.0),
    ("album", 3.0),
    ("photocard", 3.0),
    ("full album", 3.0),
    ("repackage", 2.5),
    ("pre-order", 2.5),
    ("preorder", 2.5),
    ("single", 2.5),
    ("vinyl", 2.5),
    ("music video", 2.5),
    ("tracklist", 2.0),
    ("teaser", 2.0),
    ("release", 2.0),
    ("mv", 2.0),
];

const MERCH: Weighted = &[
    ("lightstick", 3.5),
    ("merchandise", 3.0),
    ("merch", 3.0),
    ("limited edition", 3.0),
    ("pop-up store", 3.0),
    ("hoodie", 2.5),
    ("plushie", 2.5),
    ("collection", 2.5),
    ("drop", 2.5),
    ("keychain", 2.0),
    ("poster", 2.0),
    ("official store", 2.0),
];

const FAN_EVENTS: Weighted = &[
    ("fanmeet", 3.5),
    ("fan meeting", 3.5),
    ("fansign", 3.5),
    ("kcon", 3.5),
    ("hi-touch", 3.5),
    ("meet and greet", 3.0),
    ("fan event", 3.0),
    ("debut anniversary", 3.0),
    ("anniversary", 2.5),
    ("live stream", 2.5),
    ("convention", 2.5),
    ("birthday", 2.0),
];

const SUBSCRIPTIONS: Weighted = &[
    ("subscription", 3.5),
    ("membership", 3.5),
    ("bubble", 3.0),
    ("lysn", 3.0),
    ("exclusive content", 3.0),
    ("weverse", 2.5),
    ("premium", 2.5),
    ("fan kit", 2.5),
    ("early access", 2.5),
    ("streaming", 2.5),
    ("app", 2.0),
    ("platform", 2.0),
];

const BREAKING: Weighted = &[
    ("breaking", 3.0),
    ("surprise", 3.0),
    ("officially announced", 3.0),
    ("rumor confirmed", 3.0),
    ("urgent", 2.5),
    ("just in", 2.5),
    ("announces", 2.5),
    ("debuts", 2.5),
    ("confirmed", 2.0),
    ("official", 2.0),
    ("exclusive", 2.0),
    ("leaked", 2.0),
];

/// Default classifier backed by the static keyword tables above.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn categorize(&self, title: &str, content: &str) -> EventCategory {
        let title_lc = title.to_lowercase();
        let text = format!("{} {}", title_lc, content.to_lowercase());

        let mut scores = [
            (EventCategory::Concerts, score_table(CONCERTS, &text, &title_lc)),
            (EventCategory::Albums, score_table(ALBUMS, &text, &title_lc)),
            (EventCategory::Merch, score_table(MERCH, &text, &title_lc)),
            (EventCategory::FanEvents, score_table(FAN_EVENTS, &text, &title_lc)),
            (
                EventCategory::Subscriptions,
                score_table(SUBSCRIPTIONS, &text, &title_lc),
            ),
        ];

        if mentions_price(&text) {
            bump(&mut scores, EventCategory::Merch, 0.5);
            bump(&mut scores, EventCategory::Concerts, 0.3);
        }
        if text.contains("online") || text.contains("digital") {
            bump(&mut scores, EventCategory::Subscriptions, 0.5);
        }

        // First max wins on ties, so table order is the tie-break.
        let mut best = (EventCategory::Other, CATEGORY_MIN_SCORE);
        for (cat, score) in scores {
            if score > best.1 {
                best = (cat, score);
            }
        }
        best.0
    }

    pub fn is_breaking(
        &self,
        title: &str,
        content: &str,
        published: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        let title_lc = title.to_lowercase();
        let text = format!("{} {}", title_lc, content.to_lowercase());

        let mut score = 0.0;
        for (kw, w) in BREAKING {
            if text.contains(kw) {
                score += w;
                if title_lc.contains(kw) {
                    score += w * 0.5;
                }
            }
        }

        score * recency_weight(published, now) >= BREAKING_MIN_SCORE
    }
}

impl TextClassifier for KeywordClassifier {
    fn classify(
        &self,
        title: &str,
        content: &str,
        published: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Classification {
        Classification {
            category: self.categorize(title, content),
            is_breaking: self.is_breaking(title, content, published, now),
        }
    }
}

fn score_table(table: Weighted, text: &str, title_lc: &str) -> f64 {
    let mut score = 0.0;
    let mut hits = 0usize;
    for (kw, w) in table {
        if text.contains(kw) {
            score += w;
            hits += 1;
            if title_lc.contains(kw) {
                score += w * 0.5;
            }
        }
    }
    if hits > 1 {
        score += (hits - 1) as f64 * 0.5;
    }
    score
}

fn bump(scores: &mut [(EventCategory, f64)], cat: EventCategory, by: f64) {
    if let Some(entry) = scores.iter_mut().find(|(c, _)| *c == cat) {
        entry.1 += by;
    }
}

/// Newer items get a bigger multiplier. Future-dated items count as fresh.
fn recency_weight(published: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let hours = (now - published).num_minutes() as f64 / 60.0;
    match hours {
        h if h < 1.0 => 2.0,
        h if h < 6.0 => 1.5,
        h if h < 12.0 => 1.0,
        h if h < 24.0 => 0.5,
        _ => 0.1,
    }
}

/// Currency signs, an amount in won ("50,000 won") or the word "price".
/// Expects lowercased text.
fn mentions_price(text: &str) -> bool {
    static RE_PRICE: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE_PRICE.get_or_init(|| {
        regex::Regex::new(r"[$₩]|\d\s*won\b|price").expect("static price regex compiles")
    });
    re.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn concert_headline_is_categorized_as_concerts() {
        let c = KeywordClassifier::new();
        assert_eq!(
            c.categorize("SEVENTEEN announces world tour dates", "Tickets go on presale Friday"),
            EventCategory::Concerts
        );
    }

    #[test]
    fn comeback_headline_is_categorized_as_albums() {
        let c = KeywordClassifier::new();
        assert_eq!(
            c.categorize("IVE confirms comeback with new mini album", ""),
            EventCategory::Albums
        );
    }

    #[test]
    fn won_counts_as_price_only_after_an_amount() {
        assert!(mentions_price("tickets from 99,000 won"));
        assert!(mentions_price("vip seats ₩150,000"));
        assert!(mentions_price("ticket prices announced"));
        assert!(!mentions_price("iu won the daesang"));
        assert!(!mentions_price("a wonderful stage"));
    }

    #[test]
    fn weak_signal_falls_back_to_other() {
        let c = KeywordClassifier::new();
        assert_eq!(
            c.categorize("Actor spotted at airport", "Fans gathered to say hello"),
            EventCategory::Other
        );
    }

    #[test]
    fn breaking_requires_keywords_and_recency() {
        let c = KeywordClassifier::new();
        let now = Utc::now();
        let title = "BREAKING: group officially announced surprise debut";
        assert!(c.is_breaking(title, "", now - Duration::minutes(20), now));
        assert!(!c.is_breaking(title, "", now - Duration::days(3), now));
        assert!(!c.is_breaking("Weekly chart recap", "", now, now));
    }
}
