// src/config/monitor.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{env, fs, path::Path};

use crate::orchestrator::{AnalyzerSettings, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::retry::RetryPolicy;

pub const DEFAULT_MONITOR_CONFIG_PATH: &str = "config/monitor.json";
pub const ENV_MONITOR_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_cache_ttl_ms() -> u64 {
    300_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_delay_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// "gemini" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// "ENV" means: read from GEMINI_API_KEY, then API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default)]
    pub single_flight: bool,
    #[serde(default)]
    pub strict_validation: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            api_key: default_api_key(),
            cache_ttl_ms: default_cache_ttl_ms(),
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            single_flight: false,
            strict_validation: false,
        }
    }
}

impl MonitorConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: MonitorConfig = serde_json::from_str(&data)?;
        Ok(cfg.normalized())
    }

    /// 1) $MONITOR_CONFIG_PATH (must exist)
    /// 2) config/monitor.json
    /// 3) defaults
    /// then env overrides on top.
    pub fn load_default() -> anyhow::Result<Self> {
        let base = if let Ok(p) = env::var(ENV_MONITOR_CONFIG_PATH) {
            let path = Path::new(&p);
            if !path.exists() {
                anyhow::bail!("{ENV_MONITOR_CONFIG_PATH} points to non-existent path");
            }
            Self::load_from_file(path)?
        } else if Path::new(DEFAULT_MONITOR_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_MONITOR_CONFIG_PATH)?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    fn normalized(mut self) -> Self {
        self.provider = self.provider.trim().to_lowercase();
        if !(0.0..=2.0).contains(&self.temperature) {
            self.temperature = default_temperature();
        }
        self
    }

    /// `AI_TEST_MODE=mock` forces the mock provider; the `MONITOR_*` vars
    /// override individual knobs.
    pub fn with_env_overrides(mut self) -> Self {
        if env::var("AI_TEST_MODE").is_ok_and(|v| v == "mock") {
            self.provider = "mock".to_string();
        }
        if let Some(ms) = env::var("MONITOR_CACHE_TTL_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.cache_ttl_ms = ms;
        }
        if let Some(b) = env_flag("MONITOR_SINGLE_FLIGHT") {
            self.single_flight = b;
        }
        if let Some(b) = env_flag("MONITOR_STRICT_VALIDATION") {
            self.strict_validation = b;
        }
        self.normalized()
    }

    /// Resolves the "ENV" placeholder. Empty when nothing is set.
    pub fn resolved_api_key(&self) -> String {
        if self.api_key.trim().eq_ignore_ascii_case("env") {
            env::var("GEMINI_API_KEY")
                .or_else(|_| env::var("API_KEY"))
                .unwrap_or_default()
        } else {
            self.api_key.clone()
        }
    }

    pub fn is_mock(&self) -> bool {
        self.provider == "mock"
    }

    pub fn analyzer_settings(&self) -> AnalyzerSettings {
        AnalyzerSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            cache_ttl: Duration::from_millis(self.cache_ttl_ms),
            retry: RetryPolicy::new(self.max_retries, Duration::from_millis(self.initial_delay_ms)),
            single_flight: self.single_flight,
            strict_validation: self.strict_validation,
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let v = env::var(key).ok()?;
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
