// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod types;
pub mod validate;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::cache::AnalysisCache;
pub use crate::error::{AnalyzeError, ProviderError};
pub use crate::orchestrator::{Analysis, AnalyzerSettings, RegionAnalyzer};
pub use crate::types::{AnalysisResult, ConflictEvent, GroundingSource, Region};

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::config::MonitorConfig;
use crate::provider::{DynSearchModel, GeminiClient, MockModel};

/// Pick the search model named by the config.
pub fn build_model(cfg: &MonitorConfig) -> anyhow::Result<DynSearchModel> {
    if cfg.is_mock() {
        return Ok(Arc::new(MockModel::default()));
    }
    match cfg.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::new(cfg.resolved_api_key())?)),
        other => anyhow::bail!("Unsupported provider in config: {other}"),
    }
}

/// Wire config, catalog, cache and model into the HTTP state.
pub fn build_state(cfg: &MonitorConfig, regions: Vec<Region>) -> anyhow::Result<api::AppState> {
    let model = build_model(cfg)?;
    // Safe diagnostics: only provider + model + catalog size
    info!(
        provider = model.name(),
        model = %cfg.model,
        regions = regions.len(),
        "monitor config loaded"
    );
    let cache = Arc::new(AnalysisCache::new());
    let analyzer = RegionAnalyzer::new(model, cache, cfg.analyzer_settings());
    Ok(api::AppState::new(Arc::new(analyzer), regions))
}

/// Router built from the default config and region catalog locations.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = MonitorConfig::load_default()?;
    let regions = config::load_regions_default()?;
    Ok(router(build_state(&cfg, regions)?))
}
