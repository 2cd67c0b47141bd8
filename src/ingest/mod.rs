// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::FeedProvider;
use crate::story::NewsItem;
use crate::trigger::parse_cutoff;
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Dated items parsed from providers.");
        describe_counter!(
            "ingest_undated_total",
            "Items dropped because they carry no usable publish date."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("ingest_parse_ms", "Provider parse time in milliseconds.");
        describe_counter!("filter_kept_total", "Items kept by the trigger filter.");
        describe_counter!("filter_dropped_total", "Items no trigger fired on.");
    });
}

/// Decode feed text: HTML entities, tags, typographic quotes, whitespace.
pub fn decode_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z!][^>]*>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Parse a feed publish date: RFC-1123 (`Wed, 12 Oct 2016 23:59:59 GMT`)
/// first, then `2016-10-12T23:59:59Z`.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_cutoff(raw).ok())
}

/// Fetch every provider once, in order, and concatenate the items.
/// A failing provider is logged and skipped.
pub async fn run_once(providers: &[Box<dyn FeedProvider>]) -> Vec<NewsItem> {
    ensure_metrics_described();

    let mut items = Vec::new();
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => {
                tracing::debug!(target: "ingest", provider = p.name(), items = v.len(), "provider fetched");
                items.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }
    items
}
