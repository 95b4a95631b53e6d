// src/types.rs
//! Data model shared by the orchestrator, the parser and the HTTP layer.
//!
//! Field names serialize in camelCase because that is the shape the search
//! model is asked to emit (and the shape the dashboard consumes).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// ------------------------------------------------------------
// Reference data
// ------------------------------------------------------------

/// A named feed that is searched individually for a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredSource {
    pub name: String,
    pub url: String,
    /// Free-form label copied verbatim into `sourceAlignment`.
    pub alignment: String,
}

/// Control-zone polygon drawn by the map layer. Points are `[lat, lng]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    pub id: String,
    pub name: String,
    pub color: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilitantGroup {
    pub name: String,
    pub description: String,
    pub status: String,
    pub area_of_operation: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub monitored_sources: Option<Vec<MonitoredSource>>,
    #[serde(default)]
    pub territories: Option<Vec<Territory>>,
    #[serde(default)]
    pub militant_groups: Option<Vec<MilitantGroup>>,
}

impl Region {
    /// Tracked assets, empty when the region has none.
    pub fn assets(&self) -> &[MonitoredSource] {
        self.monitored_sources.as_deref().unwrap_or_default()
    }

    pub fn has_assets(&self) -> bool {
        !self.assets().is_empty()
    }
}

// ------------------------------------------------------------
// Model output
// ------------------------------------------------------------

/// Event classification. Unknown strings from the model are kept verbatim;
/// non-string values land in `Raw` as their JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum EventType {
    Conflict,
    Protest,
    Riot,
    MilitaryMove,
    Strike,
    Unrecognized(String),
    Raw(String),
}

impl EventType {
    pub const KNOWN: [EventType; 5] = [
        EventType::Conflict,
        EventType::Protest,
        EventType::Riot,
        EventType::MilitaryMove,
        EventType::Strike,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Conflict => "CONFLICT",
            EventType::Protest => "PROTEST",
            EventType::Riot => "RIOT",
            EventType::MilitaryMove => "MILITARY_MOVE",
            EventType::Strike => "STRIKE",
            EventType::Unrecognized(s) | EventType::Raw(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EventType::Unrecognized(_) | EventType::Raw(_))
    }
}

impl Default for EventType {
    fn default() -> Self {
        EventType::Unrecognized(String::new())
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CONFLICT" => EventType::Conflict,
            "PROTEST" => EventType::Protest,
            "RIOT" => EventType::Riot,
            "MILITARY_MOVE" => EventType::MilitaryMove,
            "STRIKE" => EventType::Strike,
            _ => EventType::Unrecognized(s),
        }
    }
}

impl From<Value> for EventType {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => EventType::from(s),
            other => EventType::Raw(other.to_string()),
        }
    }
}

impl From<EventType> for Value {
    fn from(t: EventType) -> Self {
        match t {
            EventType::Unrecognized(s) => Value::String(s),
            EventType::Raw(text) => raw_to_value(text),
            known => Value::String(known.as_str().to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered severity: `Raw < Unrecognized < Low < Medium < High < Critical`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Severity {
    Raw(String),
    Unrecognized(String),
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Unrecognized(s) | Severity::Raw(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Severity::Unrecognized(_) | Severity::Raw(_))
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Unrecognized(String::new())
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        match s.as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Unrecognized(s),
        }
    }
}

impl From<Value> for Severity {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => Severity::from(s),
            other => Severity::Raw(other.to_string()),
        }
    }
}

impl From<Severity> for Value {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Unrecognized(raw) => Value::String(raw),
            Severity::Raw(text) => raw_to_value(text),
            known => Value::String(known.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum SourceCategory {
    Mainstream,
    Independent,
    Unrecognized(String),
    Raw(String),
}

impl SourceCategory {
    pub fn as_str(&self) -> &str {
        match self {
            SourceCategory::Mainstream => "mainstream",
            SourceCategory::Independent => "independent",
            SourceCategory::Unrecognized(s) | SourceCategory::Raw(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SourceCategory::Unrecognized(_) | SourceCategory::Raw(_))
    }
}

impl Default for SourceCategory {
    fn default() -> Self {
        SourceCategory::Unrecognized(String::new())
    }
}

impl From<String> for SourceCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "mainstream" => SourceCategory::Mainstream,
            "independent" => SourceCategory::Independent,
            _ => SourceCategory::Unrecognized(s),
        }
    }
}

impl From<Value> for SourceCategory {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => SourceCategory::from(s),
            other => SourceCategory::Raw(other.to_string()),
        }
    }
}

impl From<SourceCategory> for Value {
    fn from(c: SourceCategory) -> Self {
        match c {
            SourceCategory::Unrecognized(raw) => Value::String(raw),
            SourceCategory::Raw(text) => raw_to_value(text),
            known => Value::String(known.as_str().to_string()),
        }
    }
}

/// Inverse of `Value::to_string` for the `Raw` variants.
fn raw_to_value(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// A coordinate as the model wrote it. Non-numbers are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coord {
    Num(f64),
    Raw(Value),
}

impl Coord {
    /// Numeric reading; numeric strings count, anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Coord::Num(n) => Some(*n),
            Coord::Raw(Value::String(s)) => s.trim().parse().ok(),
            Coord::Raw(_) => None,
        }
    }
}

impl From<f64> for Coord {
    fn from(n: f64) -> Self {
        Coord::Num(n)
    }
}

/// One incident extracted from the model's JSON array.
///
/// Only `id` is produced locally. Everything else is what the model sent,
/// whatever its JSON type; fields beyond the known shape are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub lat: Option<Coord>,
    #[serde(default)]
    pub lng: Option<Coord>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<Value>,
    #[serde(default)]
    pub source_category: SourceCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_alignment: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location_name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ConflictEvent {
    pub fn lat(&self) -> Option<f64> {
        self.lat.as_ref().and_then(Coord::as_f64)
    }

    pub fn lng(&self) -> Option<f64> {
        self.lng.as_ref().and_then(Coord::as_f64)
    }

    /// `sourceUrl` when the model sent it as a string.
    pub fn source_url_text(&self) -> Option<&str> {
        self.source_url.as_ref().and_then(Value::as_str)
    }

    /// `sourceAlignment` when the model sent it as a string.
    pub fn alignment_text(&self) -> Option<&str> {
        self.source_alignment.as_ref().and_then(Value::as_str)
    }
}

/// A web document the model reports having consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// The unit that is cached per region and handed to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub events: Vec<ConflictEvent>,
    pub summary: String,
    pub sources: Vec<GroundingSource>,
}

// ------------------------------------------------------------
// Lenient field decoding
// ------------------------------------------------------------

/// Accepts strings, numbers and booleans; `null` becomes an empty string.
fn lenient_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn severity_order_matches_escalation() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
        assert!(Severity::Unrecognized("extreme".into()) < Severity::Low);
    }

    #[test]
    fn unknown_enum_strings_survive_a_round_trip() {
        let ev: ConflictEvent = serde_json::from_value(json!({
            "title": "Shelling",
            "type": "ARTILLERY",
            "severity": "severe",
            "sourceCategory": "telegram"
        }))
        .unwrap();
        assert_eq!(ev.event_type, EventType::Unrecognized("ARTILLERY".into()));
        assert_eq!(ev.severity, Severity::Unrecognized("severe".into()));

        let back = serde_json::to_value(&ev).unwrap();
        assert_eq!(back["type"], "ARTILLERY");
        assert_eq!(back["severity"], "severe");
        assert_eq!(back["sourceCategory"], "telegram");
    }

    #[test]
    fn coordinates_accept_numeric_strings() {
        let ev: ConflictEvent = serde_json::from_value(json!({
            "lat": "48.5",
            "lng": 37.9
        }))
        .unwrap();
        assert_eq!(ev.lat(), Some(48.5));
        assert_eq!(ev.lng(), Some(37.9));

        let ev: ConflictEvent = serde_json::from_value(json!({ "lat": "north" })).unwrap();
        assert_eq!(ev.lat(), None);
    }

    #[test]
    fn coordinates_serialize_as_sent() {
        let ev: ConflictEvent = serde_json::from_value(json!({
            "lat": "north",
            "lng": "37.5"
        }))
        .unwrap();
        let back = serde_json::to_value(&ev).unwrap();
        assert_eq!(back["lat"], "north");
        assert_eq!(back["lng"], "37.5");
    }

    #[test]
    fn non_string_enums_are_kept_raw() {
        let ev: ConflictEvent = serde_json::from_value(json!({
            "type": null,
            "severity": 3,
            "sourceCategory": ["a"],
            "sourceUrl": 42
        }))
        .unwrap();
        assert_eq!(ev.event_type, EventType::Raw("null".into()));
        assert_eq!(ev.severity, Severity::Raw("3".into()));
        assert!(!ev.source_category.is_known());
        assert_eq!(ev.source_url_text(), None);

        let back = serde_json::to_value(&ev).unwrap();
        assert_eq!(back["type"], json!(null));
        assert_eq!(back["severity"], json!(3));
        assert_eq!(back["sourceCategory"], json!(["a"]));
        assert_eq!(back["sourceUrl"], json!(42));
    }

    #[test]
    fn extra_fields_are_kept() {
        let ev: ConflictEvent = serde_json::from_value(json!({
            "title": "Convoy",
            "casualties": 3
        }))
        .unwrap();
        assert_eq!(ev.extra.get("casualties"), Some(&json!(3)));
    }

    #[test]
    fn region_without_sources_has_no_assets() {
        let r: Region = serde_json::from_value(json!({
            "id": "x", "name": "X", "lat": 1.0, "lng": 2.0, "zoom": 5
        }))
        .unwrap();
        assert!(!r.has_assets());
        assert!(r.assets().is_empty());
    }
}
