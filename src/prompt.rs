// src/prompt.rs
//! Prompt text sent to the grounded search model.
//!
//! The wording is part of the external contract: the parser relies on the
//! model emitting prose first and the event array second, with the field names
//! listed in the output format block.

use std::fmt::Write as _;

use crate::types::Region;

/// Emitted instead of the asset protocol when a region tracks no assets.
pub const INDEPENDENT_DISABLED_CLAUSE: &str = "INDEPENDENT MONITORING DISABLED: No independent assets are tracked for this region. \
Do NOT search individual channels, social media accounts or any other independent sources. \
The 'Independent' feed must remain empty: do not emit any event with \"sourceCategory\": \"independent\".";

/// Header of the per-asset block; present only when assets exist.
pub const ASSET_PROTOCOL_HEADER: &str = "CLOSED-LOOP INDEPENDENT MONITORING PROTOCOL:";

/// Instructions for the independent feed.
pub fn source_instruction(region: &Region) -> String {
    let assets = region.assets();
    if assets.is_empty() {
        return INDEPENDENT_DISABLED_CLAUSE.to_string();
    }

    let mut out = String::new();
    out.push_str(ASSET_PROTOCOL_HEADER);
    out.push_str("\nYou are strictly limited to the assets provided below.\n");
    out.push_str(
        "Your goal is to extract EVERY distinct tactical event (strike, movement, protest) \
         reported by these specific channels in the last 48 hours.\n\n",
    );
    out.push_str("TRACKED ASSETS (and their required 'sourceAlignment' value):\n");
    for s in assets {
        let _ = writeln!(
            out,
            "- Asset: {} | URL: {} | Alignment: {}",
            s.name, s.url, s.alignment
        );
    }
    out.push_str("\nSEARCH TASKS:\n");
    out.push_str("1. Search the web specifically for the latest content from these URLs, one asset at a time.\n");
    out.push_str("2. DO NOT group multiple reports into one event. Create a separate JSON object for every individual report found.\n");
    out.push_str("3. Tag every event found via these links as \"sourceCategory\": \"independent\".\n");
    out.push_str("4. For every independent event, you MUST set \"sourceAlignment\" to the exact 'Alignment' string listed above for that asset.\n");
    out
}

/// Full prompt for one region.
pub fn build_prompt(region: &Region) -> String {
    format!(
        r#"Analyze {name} for tactical shifts (last 48 hours).

{sources}

MAINSTREAM PROTOCOL:
- Identify reports from major global news agencies (Reuters, AP, BBC, etc.).
- Tag these as "sourceCategory": "mainstream".
- "sourceAlignment" should be null for mainstream.

DATA EXTRACTION GOAL:
Provide as many distinct, verified event points as possible. I want a granular feed, not a summary.
Every incident is its own event; never aggregate several incidents into one entry.

OUTPUT FORMAT:
Provide a situational summary text, then a JSON list of events:
[
  {{
    "title": "Tactical/Short Title",
    "description": "Granular details: Who, what, weapon types, or units involved.",
    "type": "CONFLICT" | "PROTEST" | "RIOT" | "MILITARY_MOVE" | "STRIKE",
    "severity": "low" | "medium" | "high" | "critical",
    "lat": numerical_latitude,
    "lng": numerical_longitude,
    "locationName": "Precise City/Village/District",
    "timestamp": "ISO timestamp",
    "sourceUrl": "Link to the specific post or the asset home page if post URL unavailable",
    "sourceCategory": "independent" | "mainstream",
    "sourceAlignment": "The 'Alignment' string of the reporting asset"
  }}
]

Ensure coordinates are precise. For independent sources, provide the direct link found during search.
"#,
        name = region.name,
        sources = source_instruction(region),
    )
}
