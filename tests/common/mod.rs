// tests/common/mod.rs
// Shared fakes for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use conflict_monitor::provider::{GenerateRequest, GenerateResponse, GroundingChunk, SearchModel};
use conflict_monitor::types::{MonitoredSource, Region};
use conflict_monitor::ProviderError;
use tokio::time::Instant;

/// Plays back queued outcomes in order; once the queue is empty every call
/// succeeds with `fallback`.
#[derive(Clone)]
pub struct ScriptedModel {
    script: Arc<Mutex<VecDeque<Result<GenerateResponse, ProviderError>>>>,
    fallback: GenerateResponse,
    calls: Arc<Mutex<Vec<(Instant, GenerateRequest)>>>,
}

impl ScriptedModel {
    pub fn new(fallback: GenerateResponse) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn then(self, outcome: Result<GenerateResponse, ProviderError>) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    pub fn fail_times(self, n: usize, err: ProviderError) -> Self {
        for _ in 0..n {
            self.script.lock().unwrap().push_back(Err(err.clone()));
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(_, r)| r.prompt.clone())
    }
}

#[async_trait]
impl SearchModel for ScriptedModel {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        self.calls.lock().unwrap().push((Instant::now(), req.clone()));
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn rate_limited() -> ProviderError {
    ProviderError::Api {
        code: 429,
        status: Some("RESOURCE_EXHAUSTED".into()),
        message: "Resource has been exhausted (e.g. check quota).".into(),
    }
}

pub fn forbidden() -> ProviderError {
    ProviderError::Api {
        code: 403,
        status: Some("PERMISSION_DENIED".into()),
        message: "API key not valid.".into(),
    }
}

pub fn tense_response() -> GenerateResponse {
    GenerateResponse {
        text: concat!(
            "Situation is tense. ",
            r#"[{"title":"Strike","description":"Drone strike on depot","type":"STRIKE","severity":"high","#,
            r#""lat":47.09,"lng":37.54,"locationName":"Mariupol","timestamp":"2025-02-01T03:00:00Z","#,
            r#""sourceUrl":"https://t.me/DeepStateUA/1","sourceCategory":"independent","sourceAlignment":"Pro-Ukraine/Map"}]"#
        )
        .to_string(),
        grounding: vec![GroundingChunk {
            title: Some("Reuters".into()),
            uri: Some("https://reuters.com/a".into()),
        }],
    }
}

pub fn region(id: &str, sources: Option<Vec<MonitoredSource>>) -> Region {
    Region {
        id: id.to_string(),
        name: "Ukraine".to_string(),
        lat: 48.38,
        lng: 31.17,
        zoom: 6,
        description: "frontline".to_string(),
        monitored_sources: sources,
        territories: None,
        militant_groups: None,
    }
}

pub fn deepstate() -> MonitoredSource {
    MonitoredSource {
        name: "DeepStateUA".into(),
        url: "https://t.me/DeepStateUA".into(),
        alignment: "Pro-Ukraine/Map".into(),
    }
}
