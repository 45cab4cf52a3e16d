// src/analyze/matcher.rs
//! Artist matching against free text.
//!
//! Text and names are folded to lowercase alphanumeric tokens, so "Stray Kids'",
//! "STRAY-KIDS" and "stray kids" all line up. A name matches when its token
//! sequence appears verbatim, or (for names of 4+ characters) when a window of
//! the same width is close enough by `strsim::normalized_levenshtein`.
//!
//! Output keeps the caller's order and never contains names the caller did not pass.

use strsim::normalized_levenshtein;

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.85;

pub trait ArtistMatcher: Send + Sync {
    fn find_matches(&self, text: &str, candidates: &[String]) -> Vec<String>;
}

#[derive(Debug, Clone)]
pub struct FuzzyArtistMatcher {
    threshold: f64,
}

impl Default for FuzzyArtistMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl FuzzyArtistMatcher {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    fn matches_one(&self, text_tokens: &[String], name: &str) -> bool {
        let name_tokens = tokenize(name);
        if name_tokens.is_empty() || name_tokens.len() > text_tokens.len() {
            return false;
        }
        let width = name_tokens.len();

        if text_tokens.windows(width).any(|w| w == name_tokens.as_slice()) {
            return true;
        }

        let joined = name_tokens.join(" ");
        if joined.chars().count() < 4 {
            return false;
        }
        text_tokens
            .windows(width)
            .any(|w| normalized_levenshtein(&w.join(" "), &joined) >= self.threshold)
    }
}

impl ArtistMatcher for FuzzyArtistMatcher {
    fn find_matches(&self, text: &str, candidates: &[String]) -> Vec<String> {
        let text_tokens = tokenize(text);
        let mut out: Vec<String> = Vec::new();
        for name in candidates {
            if out.iter().any(|m| m == name) {
                continue;
            }
            if self.matches_one(&text_tokens, name) {
                out.push(name.clone());
            }
        }
        out
    }
}

fn tokenize(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
