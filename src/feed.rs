// src/feed.rs
//! Dashboard-side views over an event list: type filter, mainstream vs
//! independent split, threat level.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::{ConflictEvent, EventType, Severity, SourceCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Elevated,
    Critical,
}

/// Which events the caller wants to see. Default shows everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub types: HashSet<EventType>,
    pub category: Option<SourceCategory>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            types: EventType::KNOWN.into_iter().collect(),
            category: None,
        }
    }
}

impl EventFilter {
    /// Parses `STRIKE,RIOT` style lists; unknown names are ignored. An empty
    /// or missing list keeps all known types.
    pub fn from_query(types: Option<&str>, category: Option<&str>) -> Self {
        let mut filter = Self::default();
        if let Some(raw) = types {
            let picked: HashSet<EventType> = raw
                .split(',')
                .map(|t| EventType::from(t.trim().to_ascii_uppercase()))
                .filter(EventType::is_known)
                .collect();
            if !picked.is_empty() {
                filter.types = picked;
            }
        }
        filter.category = category
            .map(|c| SourceCategory::from(c.trim().to_ascii_lowercase()))
            .filter(SourceCategory::is_known);
        filter
    }

    pub fn toggle(&mut self, t: EventType) {
        if !self.types.remove(&t) {
            self.types.insert(t);
        }
    }

    pub fn matches(&self, ev: &ConflictEvent) -> bool {
        self.types.contains(&ev.event_type)
            && self
                .category
                .as_ref()
                .map_or(true, |c| &ev.source_category == c)
    }

    pub fn apply<'a>(&self, events: &'a [ConflictEvent]) -> Vec<&'a ConflictEvent> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

pub fn split_by_category<'a, I>(events: I) -> (Vec<&'a ConflictEvent>, Vec<&'a ConflictEvent>)
where
    I: IntoIterator<Item = &'a ConflictEvent>,
{
    let mut mainstream = Vec::new();
    let mut independent = Vec::new();
    for ev in events {
        match ev.source_category {
            SourceCategory::Mainstream => mainstream.push(ev),
            SourceCategory::Independent => independent.push(ev),
            SourceCategory::Unrecognized(_) | SourceCategory::Raw(_) => {}
        }
    }
    (mainstream, independent)
}

pub fn threat_level<'a, I>(events: I) -> ThreatLevel
where
    I: IntoIterator<Item = &'a ConflictEvent>,
{
    if events.into_iter().any(|e| e.severity == Severity::Critical) {
        ThreatLevel::Critical
    } else {
        ThreatLevel::Elevated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSummary {
    pub total: usize,
    pub mainstream: usize,
    pub independent: usize,
    pub threat_level: ThreatLevel,
}

pub fn summarize(events: &[&ConflictEvent]) -> FeedSummary {
    let (m, i) = split_by_category(events.iter().copied());
    FeedSummary {
        total: events.len(),
        mainstream: m.len(),
        independent: i.len(),
        threat_level: threat_level(events.iter().copied()),
    }
}
