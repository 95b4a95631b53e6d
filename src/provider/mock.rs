// src/provider/mock.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{GenerateRequest, GenerateResponse, GroundingChunk, SearchModel};
use crate::error::ProviderError;

/// Deterministic model for local runs (`AI_TEST_MODE=mock`) and tests.
#[derive(Debug, Clone)]
pub struct MockModel {
    pub fixed: GenerateResponse,
    calls: Arc<AtomicUsize>,
}

impl MockModel {
    pub fn new(fixed: GenerateResponse) -> Self {
        Self {
            fixed,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `generate` calls so far (shared across clones).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new(GenerateResponse {
            text: concat!(
                "Mock feed: front lines static, sporadic shelling reported.\n",
                r#"[{"title":"Artillery exchange","description":"Mock incident","type":"CONFLICT","#,
                r#""severity":"medium","lat":48.0,"lng":37.8,"locationName":"Mockville","#,
                r#""timestamp":"2025-01-01T00:00:00Z","sourceCategory":"mainstream"}]"#
            )
            .to_string(),
            grounding: vec![GroundingChunk {
                title: Some("Mock wire".to_string()),
                uri: Some("https://example.org/mock".to_string()),
            }],
        })
    }
}

#[async_trait]
impl SearchModel for MockModel {
    async fn generate(&self, _req: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fixed.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
