// src/parser.rs
//! Turns the model's free-form answer into summary, events and sources.
//!
//! The model answers with prose followed by a JSON array. Extraction is
//! regex based and best-effort: a missing or broken array yields no events,
//! never an error.

use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, warn};

use crate::provider::GroundingChunk;
use crate::types::{AnalysisResult, ConflictEvent, GroundingSource};

/// Greedy: from the first `[ {` to the last `} ]` in the text.
static RE_EVENT_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*\{[\s\S]*\}\s*\]").expect("event array regex"));

/// Start of the event array; everything before it is the summary.
static RE_ARRAY_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*\{").expect("array start regex"));

/// Builds a full result from raw model output, stamping ids with the current time.
pub fn parse_response(text: &str, chunks: &[GroundingChunk]) -> AnalysisResult {
    let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
    parse_response_at(text, chunks, now_ms)
}

/// Same as [`parse_response`] with an explicit extraction time.
pub fn parse_response_at(text: &str, chunks: &[GroundingChunk], extracted_at_ms: u64) -> AnalysisResult {
    AnalysisResult {
        events: extract_events(text, extracted_at_ms),
        summary: extract_summary(text),
        sources: extract_sources(chunks),
    }
}

pub fn extract_sources(chunks: &[GroundingChunk]) -> Vec<GroundingSource> {
    chunks
        .iter()
        .map(|c| GroundingSource {
            title: non_empty(c.title.as_deref()).unwrap_or("Source").to_string(),
            uri: non_empty(c.uri.as_deref()).unwrap_or("#").to_string(),
        })
        .collect()
}

/// The raw JSON array text, if the answer contains one.
pub fn find_event_array(text: &str) -> Option<&str> {
    RE_EVENT_ARRAY.find(text).map(|m| m.as_str())
}

/// Parses the embedded array. Ids are `event-{index}-{extracted_at_ms}`.
///
/// Elements that are not JSON objects are skipped; objects pass through
/// without validation, whatever their field types.
pub fn extract_events(text: &str, extracted_at_ms: u64) -> Vec<ConflictEvent> {
    let Some(raw) = find_event_array(text) else {
        return Vec::new();
    };

    let items: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            error!(target: "monitor", error = %e, fragment_len = raw.len(), "failed to parse event JSON");
            counter!("parser_failures_total").increment(1);
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!(target: "monitor", index = idx, "skipping non-object array element");
            continue;
        }
        // every field decoder accepts any JSON value, so objects always decode
        match serde_json::from_value::<ConflictEvent>(item) {
            Ok(mut ev) => {
                ev.id = format!("event-{idx}-{extracted_at_ms}");
                out.push(ev);
            }
            Err(e) => {
                warn!(target: "monitor", index = idx, error = %e, "skipping malformed event object");
            }
        }
    }
    out
}

/// Text before the first `[{`, with code fences removed and whitespace trimmed.
pub fn extract_summary(text: &str) -> String {
    let head = match RE_ARRAY_START.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    };
    head.replace("```json", "").replace("```", "").trim().to_string()
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}
