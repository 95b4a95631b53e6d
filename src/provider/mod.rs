// src/provider/mod.rs
//! Search-model abstraction. The orchestrator only sees `SearchModel`; the
//! concrete clients live in submodules.

pub mod gemini;
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProviderError;

pub use gemini::GeminiClient;
pub use mock::MockModel;

/// One grounded-generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    /// Attach the provider's web-search tool.
    pub web_search: bool,
}

/// Citation as reported by the provider; either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingChunk {
    pub title: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    pub text: String,
    pub grounding: Vec<GroundingChunk>,
}

#[async_trait]
pub trait SearchModel: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, ProviderError>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynSearchModel = Arc<dyn SearchModel>;
