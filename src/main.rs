//! Conflict monitor binary entrypoint.
//! Boots the Axum HTTP server, wiring config, the analysis pipeline and metrics.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use conflict_monitor::config::{load_regions_default, MonitorConfig};
use conflict_monitor::metrics::Metrics;
use conflict_monitor::{build_state, router};

/// Compact tracing logs. Filter from RUST_LOG, else `conflict_monitor=info,warn`.
/// Set MONITOR_LOG_JSON=1 for JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("conflict_monitor=info,monitor=info,warn"));

    let json = std::env::var("MONITOR_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    // Shuttle may have installed a subscriber already; keep theirs in that case.
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = MonitorConfig::load_default().context("loading monitor config")?;
    let regions = load_regions_default().context("loading region catalog")?;
    let metrics = Metrics::init(cfg.cache_ttl_ms).context("installing metrics recorder")?;

    let state = build_state(&cfg, regions)?;
    let app = router(state).merge(metrics.router());

    Ok(app.into())
}
