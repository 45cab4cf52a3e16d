// src/analyze/mod.rs
//! Text analysis used by the normalizer: category/breaking classification and
//! artist matching. Both sit behind traits so callers can swap in other engines.

pub mod classifier;
pub mod matcher;

pub use crate::analyze::classifier::{Classification, KeywordClassifier, TextClassifier};
pub use crate::analyze::matcher::{ArtistMatcher, FuzzyArtistMatcher};
