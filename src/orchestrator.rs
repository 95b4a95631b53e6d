// src/orchestrator.rs
//! Region analysis pipeline: cache → prompt → provider (with backoff) →
//! parser → cache.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, error, info, warn};

use crate::cache::{AnalysisCache, DEFAULT_TTL};
use crate::coalesce::RegionCoalescer;
use crate::error::AnalyzeError;
use crate::parser::parse_response_at;
use crate::prompt::build_prompt;
use crate::provider::{DynSearchModel, GenerateRequest};
use crate::retry::{with_retry, RetryPolicy};
use crate::types::{AnalysisResult, Region};
use crate::validate::validate_events;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerSettings {
    pub model: String,
    pub temperature: f32,
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
    /// Share one upstream call between concurrent misses for a region.
    pub single_flight: bool,
    /// Drop events that fail `validate::check_event`.
    pub strict_validation: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            cache_ttl: DEFAULT_TTL,
            retry: RetryPolicy::default(),
            single_flight: false,
            strict_validation: false,
        }
    }
}

/// Outcome of one `analyze` call, with cache provenance for diagnostics.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: Arc<AnalysisResult>,
    pub cache_hit: bool,
}

pub struct RegionAnalyzer {
    model: DynSearchModel,
    cache: Arc<AnalysisCache>,
    settings: AnalyzerSettings,
    coalescer: Option<RegionCoalescer>,
}

impl RegionAnalyzer {
    pub fn new(model: DynSearchModel, cache: Arc<AnalysisCache>, settings: AnalyzerSettings) -> Self {
        let coalescer = settings.single_flight.then(RegionCoalescer::new);
        Self {
            model,
            cache,
            settings,
            coalescer,
        }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    pub fn provider_name(&self) -> &'static str {
        self.model.name()
    }

    /// The request that would be sent for `region`.
    pub fn build_request(&self, region: &Region) -> GenerateRequest {
        GenerateRequest {
            model: self.settings.model.clone(),
            prompt: build_prompt(region),
            temperature: self.settings.temperature,
            web_search: true,
        }
    }

    /// Cached result for the region, or a fresh one from the provider.
    pub async fn analyze_region(&self, region: &Region) -> Result<Arc<AnalysisResult>, AnalyzeError> {
        self.analyze(region).await.map(|a| a.result)
    }

    pub async fn analyze(&self, region: &Region) -> Result<Analysis, AnalyzeError> {
        if region.id.trim().is_empty() {
            return Err(AnalyzeError::InvalidRegion);
        }

        if let Some(hit) = self.cached(region) {
            return Ok(hit);
        }

        let flight = match &self.coalescer {
            Some(c) => Some(c.acquire(&region.id).await),
            None => None,
        };
        if flight.is_some() {
            // another caller may have filled the entry while we waited
            if let Some(hit) = self.cached(region) {
                return Ok(hit);
            }
        }

        info!(
            target: "monitor",
            region = %region.id,
            provider = self.model.name(),
            assets = region.assets().len(),
            "fetching fresh analysis"
        );

        let req = self.build_request(region);
        let model = &self.model;
        let req_ref = &req;
        let resp = with_retry(self.settings.retry, move || model.generate(req_ref))
            .await
            .map_err(|e| {
                error!(target: "monitor", region = %region.id, error = %e, "provider call failed after retries");
                counter!("provider_failures_total").increment(1);
                e
            })?;

        let mut result = parse_response_at(&resp.text, &resp.grounding, self.cache.now_ms());

        if self.settings.strict_validation {
            let report = validate_events(std::mem::take(&mut result.events));
            if !report.quarantined.is_empty() {
                for (ev, violations) in &report.quarantined {
                    warn!(
                        target: "monitor",
                        region = %region.id,
                        event = %ev.id,
                        violations = ?violations,
                        "event quarantined"
                    );
                }
                counter!("events_quarantined_total").increment(report.quarantined.len() as u64);
            }
            result.events = report.accepted;
        }

        let result = Arc::new(result);
        self.cache.put(&region.id, Arc::clone(&result));
        debug!(
            target: "monitor",
            region = %region.id,
            events = result.events.len(),
            sources = result.sources.len(),
            "analysis cached"
        );

        Ok(Analysis {
            result,
            cache_hit: false,
        })
    }

    fn cached(&self, region: &Region) -> Option<Analysis> {
        let hit = self.cache.get(&region.id, self.settings.cache_ttl)?;
        debug!(target: "monitor", region = %region.id, "returning cached analysis");
        Some(Analysis {
            result: hit,
            cache_hit: true,
        })
    }
}
