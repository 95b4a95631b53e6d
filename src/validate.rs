// src/validate.rs
//! Optional strict check of model-supplied events.
//!
//! The parser passes fields through as the model wrote them. With strict
//! validation enabled the orchestrator runs events through here and drops
//! the ones that would mislead the map (unknown enums, off-globe coordinates,
//! unparseable timestamps).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::types::{ConflictEvent, SourceCategory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Violation {
    UnknownType(String),
    UnknownSeverity(String),
    UnknownCategory(String),
    MissingCoordinate(&'static str),
    OutOfRange(&'static str),
    BadTimestamp(String),
    MissingAlignment,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub accepted: Vec<ConflictEvent>,
    pub quarantined: Vec<(ConflictEvent, Vec<Violation>)>,
}

pub fn check_event(ev: &ConflictEvent) -> Vec<Violation> {
    let mut v = Vec::new();

    if !ev.event_type.is_known() {
        v.push(Violation::UnknownType(ev.event_type.as_str().to_string()));
    }
    if !ev.severity.is_known() {
        v.push(Violation::UnknownSeverity(ev.severity.as_str().to_string()));
    }
    if !ev.source_category.is_known() {
        v.push(Violation::UnknownCategory(ev.source_category.as_str().to_string()));
    }

    match ev.lat() {
        None => v.push(Violation::MissingCoordinate("lat")),
        Some(lat) if !(-90.0..=90.0).contains(&lat) => v.push(Violation::OutOfRange("lat")),
        _ => {}
    }
    match ev.lng() {
        None => v.push(Violation::MissingCoordinate("lng")),
        Some(lng) if !(-180.0..=180.0).contains(&lng) => v.push(Violation::OutOfRange("lng")),
        _ => {}
    }

    if !is_timestamp(ev.timestamp.trim()) {
        v.push(Violation::BadTimestamp(ev.timestamp.clone()));
    }

    if ev.source_category == SourceCategory::Independent
        && ev.alignment_text().map_or(true, |a| a.trim().is_empty())
    {
        v.push(Violation::MissingAlignment);
    }

    v
}

/// RFC 3339, or ISO 8601 local date-time / date without an offset.
fn is_timestamp(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

pub fn validate_events(events: Vec<ConflictEvent>) -> ValidationReport {
    let mut report = ValidationReport::default();
    for ev in events {
        let violations = check_event(&ev);
        if violations.is_empty() {
            report.accepted.push(ev);
        } else {
            report.quarantined.push((ev, violations));
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ev(v: serde_json::Value) -> ConflictEvent {
        serde_json::from_value(v).unwrap()
    }

    fn good() -> serde_json::Value {
        json!({
            "title": "Drone strike",
            "type": "STRIKE",
            "severity": "high",
            "lat": 50.45,
            "lng": 30.52,
            "timestamp": "2025-03-01T04:10:00Z",
            "sourceCategory": "independent",
            "sourceAlignment": "OSINT/Visual",
            "locationName": "Kyiv"
        })
    }

    #[test]
    fn well_formed_event_passes() {
        assert!(check_event(&ev(good())).is_empty());
    }

    #[test]
    fn collects_every_violation() {
        let mut raw = good();
        raw["type"] = json!("SKIRMISH");
        raw["lat"] = json!(123.0);
        raw["timestamp"] = json!("yesterday");
        raw["sourceAlignment"] = json!(null);
        let got = check_event(&ev(raw));
        assert_eq!(
            got,
            vec![
                Violation::UnknownType("SKIRMISH".into()),
                Violation::OutOfRange("lat"),
                Violation::BadTimestamp("yesterday".into()),
                Violation::MissingAlignment,
            ]
        );
    }

    #[test]
    fn offsetless_iso_timestamps_are_accepted() {
        for ts in ["2025-02-01T03:00:00", "2025-02-01T03:00:00.250", "2025-02-01 03:00:00", "2025-02-01"] {
            let mut raw = good();
            raw["timestamp"] = json!(ts);
            assert!(check_event(&ev(raw)).is_empty(), "{ts}");
        }
        let mut raw = good();
        raw["timestamp"] = json!("2025-13-40");
        assert_eq!(
            check_event(&ev(raw)),
            vec![Violation::BadTimestamp("2025-13-40".into())]
        );
    }

    #[test]
    fn mainstream_needs_no_alignment() {
        let mut raw = good();
        raw["sourceCategory"] = json!("mainstream");
        raw["sourceAlignment"] = json!(null);
        assert!(check_event(&ev(raw)).is_empty());
    }

    #[test]
    fn report_splits_accepted_and_quarantined() {
        let mut bad = good();
        bad["lng"] = json!("east");
        let report = validate_events(vec![ev(good()), ev(bad)]);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.quarantined.len(), 1);
        assert_eq!(report.quarantined[0].1, vec![Violation::MissingCoordinate("lng")]);
    }
}
