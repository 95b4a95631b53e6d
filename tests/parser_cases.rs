//! Response parsing against the shapes the search model actually produces:
//! prose only, prose + broken JSON, prose + fenced JSON, bare array.

use conflict_monitor::parser::{parse_response, parse_response_at};
use conflict_monitor::provider::GroundingChunk;
use conflict_monitor::types::{EventType, Severity, SourceCategory};

#[test]
fn no_array_gives_no_events_and_full_summary() {
    let text = "\n  Quiet night along the line of contact. No confirmed strikes.  \n";
    let out = parse_response(text, &[]);
    assert!(out.events.is_empty());
    assert_eq!(out.summary, "Quiet night along the line of contact. No confirmed strikes.");
}

#[test]
fn malformed_array_is_swallowed() {
    let text = "Reports are conflicting. [{ bad json, \"title\": }]";
    let out = parse_response(text, &[]);
    assert!(out.events.is_empty());
    assert_eq!(out.summary, "Reports are conflicting.");
}

#[test]
fn unterminated_array_is_not_matched() {
    let text = "Reports are conflicting. [{ bad json";
    let out = parse_response(text, &[]);
    assert!(out.events.is_empty());
    assert_eq!(out.summary, "Reports are conflicting.");
}

#[test]
fn well_formed_array_passes_fields_through() {
    let text = concat!(
        "Situation is tense. ",
        r#"[{"title":"Strike","type":"STRIKE","severity":"high","lat":36.2,"lng":37.15,"#,
        r#""locationName":"Aleppo","timestamp":"2025-05-02T10:00:00Z","sourceCategory":"mainstream","#,
        r#""sourceUrl":"https://apnews.com/x","description":"Airstrike on a depot"}]"#
    );
    let out = parse_response_at(text, &[], 1_746_180_000_000);
    assert_eq!(out.summary, "Situation is tense.");
    assert_eq!(out.events.len(), 1);

    let ev = &out.events[0];
    assert_eq!(ev.id, "event-0-1746180000000");
    assert_eq!(ev.title, "Strike");
    assert_eq!(ev.event_type, EventType::Strike);
    assert_eq!(ev.severity, Severity::High);
    assert_eq!(ev.lat(), Some(36.2));
    assert_eq!(ev.lng(), Some(37.15));
    assert_eq!(ev.location_name, "Aleppo");
    assert_eq!(ev.timestamp, "2025-05-02T10:00:00Z");
    assert_eq!(ev.source_category, SourceCategory::Mainstream);
    assert_eq!(ev.source_url_text(), Some("https://apnews.com/x"));
    assert_eq!(ev.source_alignment, None);
    assert_eq!(ev.description, "Airstrike on a depot");
}

#[test]
fn ids_are_unique_within_a_batch() {
    let text = r#"Two incidents. [{"title":"a"},{"title":"b"},{"title":"c"}]"#;
    let out = parse_response_at(text, &[], 99);
    let ids: Vec<&str> = out.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["event-0-99", "event-1-99", "event-2-99"]);
}

#[test]
fn invalid_values_are_not_rejected_here() {
    let text = r#"Odd output. [{"title":"x","type":"AMBUSH","severity":"apocalyptic","lat":"91.5","lng":"far east"}]"#;
    let out = parse_response(text, &[]);
    let ev = &out.events[0];
    assert_eq!(ev.event_type, EventType::Unrecognized("AMBUSH".into()));
    assert_eq!(ev.severity, Severity::Unrecognized("apocalyptic".into()));
    assert_eq!(ev.lat(), Some(91.5));
    assert_eq!(ev.lng(), None);
}

#[test]
fn odd_json_types_keep_the_event() {
    let text = concat!(
        "S. [",
        r#"{"title":"a","type":"STRIKE","severity":null},"#,
        r#"{"title":"b","type":null,"severity":"high"},"#,
        r#"{"title":"c","severity":3},"#,
        r#"{"title":"d","sourceUrl":42,"lat":"north","lng":"37.5"}"#,
        "]"
    );
    let out = parse_response_at(text, &[], 1);
    let titles: Vec<&str> = out.events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["a", "b", "c", "d"]);
    assert_eq!(out.events[1].severity, Severity::High);
    assert!(!out.events[1].event_type.is_known());

    let d = serde_json::to_value(&out.events[3]).unwrap();
    assert_eq!(d["sourceUrl"], 42);
    assert_eq!(d["lat"], "north");
    assert_eq!(d["lng"], "37.5");
    assert_eq!(d["id"], "event-3-1");
}

#[test]
fn fenced_block_is_stripped_from_summary() {
    let text = "```json\nOvernight escalation in the north.\n```json\n[\n  {\"title\":\"Shelling\"}\n]\n```";
    let out = parse_response(text, &[]);
    assert_eq!(out.summary, "Overnight escalation in the north.");
    assert_eq!(out.events.len(), 1);
}

#[test]
fn array_at_start_gives_empty_summary() {
    let out = parse_response(r#"[{"title":"Protest"}] trailing note"#, &[]);
    assert_eq!(out.summary, "");
    assert_eq!(out.events.len(), 1);
}

#[test]
fn empty_grounding_gives_empty_sources() {
    let out = parse_response("Nothing to cite.", &[]);
    assert!(out.sources.is_empty());
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["sources"], serde_json::json!([]));
}

#[test]
fn sources_keep_order_and_fill_gaps() {
    let chunks = vec![
        GroundingChunk {
            title: Some("BBC".into()),
            uri: Some("https://bbc.co.uk/1".into()),
        },
        GroundingChunk::default(),
    ];
    let out = parse_response("x", &chunks);
    assert_eq!(out.sources.len(), 2);
    assert_eq!(out.sources[0].title, "BBC");
    assert_eq!(out.sources[1].title, "Source");
    assert_eq!(out.sources[1].uri, "#");
}
