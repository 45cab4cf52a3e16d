// src/ingest/mod.rs
pub mod feed_parser;
pub mod fetchers;
pub mod normalize;
pub mod providers;
pub mod types;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "feed_items_parsed_total",
            "Raw items read from feed documents."
        );
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
        describe_counter!(
            "ingest_items_dropped_total",
            "Items dropped by the normalizer (empty title)."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Transport or status errors from upstream providers."
        );
        describe_counter!(
            "timeline_source_failures_total",
            "Per-source fetch failures, labelled by source and kind."
        );
        describe_counter!("timeline_cycles_total", "Completed refresh cycles by outcome.");
        describe_counter!(
            "timeline_cycles_skipped_total",
            "Refresh requests dropped (in flight or still fresh)."
        );
        describe_counter!("timeline_scheduler_ticks_total", "Scheduler ticks.");
        describe_gauge!("timeline_events", "Events currently published on the timeline.");
        describe_gauge!(
            "timeline_last_success_ts",
            "Unix ts of the last cycle with any success."
        );
    });
}

/// Clean feed text: decode entities, strip tags, fold quotes, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| {
        regex::Regex::new(r"(?is)</?[a-z!][^>]*>").expect("static tag regex compiles")
    });
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. NBSP)
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws =
        RE_WS.get_or_init(|| regex::Regex::new(r"[\s\u{00A0}]+").expect("static ws regex compiles"));
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Cut to at most `max` chars (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
