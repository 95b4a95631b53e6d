// src/provider/gemini.rs
//! Gemini `generateContent` client with the Google Search tool attached.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GenerateRequest, GenerateResponse, GroundingChunk, SearchModel};
use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client somewhere else (tests, proxies).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::Config("missing Gemini API key".into()));
        }
        let http = reqwest::Client::builder()
            .user_agent("conflict-monitor/0.1")
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProviderError::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

// ------------------------------------------------------------
// Wire format
// ------------------------------------------------------------

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Req<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Default, Deserialize)]
struct Resp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<RespContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct RespContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}

#[derive(Debug, Default, Deserialize)]
struct RespPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<Chunk>,
}

#[derive(Debug, Default, Deserialize)]
struct Chunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    title: Option<String>,
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn api_error(http_status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => ProviderError::Api {
            code: env.error.code.unwrap_or(http_status),
            status: env.error.status,
            message: env.error.message,
        },
        Err(_) => ProviderError::Api {
            code: http_status,
            status: None,
            message: body.chars().take(300).collect(),
        },
    }
}

fn into_response(resp: Resp) -> GenerateResponse {
    let Some(first) = resp.candidates.into_iter().next() else {
        return GenerateResponse::default();
    };
    let text = first
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    let grounding = first
        .grounding_metadata
        .map(|m| {
            m.grounding_chunks
                .into_iter()
                .map(|c| {
                    let web = c.web.unwrap_or_default();
                    GroundingChunk {
                        title: web.title,
                        uri: web.uri,
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    GenerateResponse { text, grounding }
}

#[async_trait]
impl SearchModel for GeminiClient {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let body = Req {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &req.prompt }],
            }],
            tools: if req.web_search {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
            generation_config: GenerationConfig {
                temperature: req.temperature,
            },
        };

        let t0 = Instant::now();
        let resp = self
            .http
            .post(self.endpoint(&req.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        histogram!("provider_call_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }

        let parsed: Resp = resp.json().await?;
        let out = into_response(parsed);
        debug!(
            target: "monitor",
            model = %req.model,
            text_len = out.text.len(),
            chunks = out.grounding.len(),
            "gemini response"
        );
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
