use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::AnalyzeError;
use crate::feed::{summarize, EventFilter, FeedSummary};
use crate::orchestrator::RegionAnalyzer;
use crate::types::{ConflictEvent, GroundingSource, Region};

pub const CACHE_HEADER: &str = "x-analysis-cache";

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<RegionAnalyzer>,
    pub regions: Arc<Vec<Region>>,
}

impl AppState {
    pub fn new(analyzer: Arc<RegionAnalyzer>, regions: Vec<Region>) -> Self {
        Self {
            analyzer,
            regions: Arc::new(regions),
        }
    }

    fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/regions", get(list_regions))
        .route("/api/regions/{id}", get(get_region))
        .route("/api/regions/{id}/analysis", get(region_analysis))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorOut {
    error: &'static str,
    message: String,
}

fn unknown_region(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorOut {
            error: "unknown_region",
            message: format!("no region with id '{id}'"),
        }),
    )
        .into_response()
}

async fn list_regions(State(state): State<AppState>) -> Json<Vec<Region>> {
    Json(state.regions.as_ref().clone())
}

async fn get_region(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.region(&id) {
        Some(r) => Json(r.clone()).into_response(),
        None => unknown_region(&id),
    }
}

#[derive(Debug, Default, Deserialize)]
struct FeedQuery {
    /// Comma separated event types, e.g. `STRIKE,RIOT`.
    types: Option<String>,
    /// `mainstream` | `independent`
    category: Option<String>,
}

#[derive(Serialize)]
struct AnalysisOut<'a> {
    summary: &'a str,
    events: Vec<&'a ConflictEvent>,
    sources: &'a [GroundingSource],
    feed: FeedSummary,
}

async fn region_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<FeedQuery>,
) -> Response {
    let Some(region) = state.region(&id) else {
        return unknown_region(&id);
    };

    match state.analyzer.analyze(region).await {
        Ok(analysis) => {
            let filter = EventFilter::from_query(q.types.as_deref(), q.category.as_deref());
            let shown = filter.apply(&analysis.result.events);
            let feed = summarize(&shown);
            let body = AnalysisOut {
                summary: &analysis.result.summary,
                events: shown,
                sources: &analysis.result.sources,
                feed,
            };
            let mut resp = Json(body).into_response();
            resp.headers_mut().insert(
                CACHE_HEADER,
                HeaderValue::from_static(if analysis.cache_hit { "HIT" } else { "MISS" }),
            );
            resp
        }
        Err(e) => analysis_error(&e),
    }
}

fn analysis_error(e: &AnalyzeError) -> Response {
    let (status, code) = if e.is_rate_limited() {
        (StatusCode::TOO_MANY_REQUESTS, "rate_limited")
    } else {
        (StatusCode::BAD_GATEWAY, "link_failed")
    };
    (
        status,
        Json(ErrorOut {
            error: code,
            message: e.user_message().to_string(),
        }),
    )
        .into_response()
}
