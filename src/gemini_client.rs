use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Settings;

/// A text-in, text-out generative model. The form filler and resume deriver
/// only depend on this seam, so tests can substitute a scripted model.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String, // default official; override for proxies/tests
    pub model: String,    // e.g., "gemini-2.5-flash"
    pub timeout: Duration,
}

impl GeminiConfig {
    /// The key lives in the profile, everything else comes from the environment.
    pub fn new(settings: &Settings, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: settings.gemini_base_url.trim_end_matches('/').to_string(),
            model: settings.gemini_model.clone(),
            timeout: settings.gemini_timeout,
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Deserialize, Debug)]
struct GeminiErrorDetail {
    message: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    cfg: GeminiConfig,
}

impl GeminiClient {
    pub fn new(cfg: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(cfg.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, cfg })
    }

    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// One `generateContent` call, no retries. Returns the concatenated text
    /// parts of the first candidate.
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.cfg.base_url, self.cfg.model);
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!("Gemini generate_content: model={} prompt_chars={}", self.cfg.model, prompt.len());

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.cfg.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("failed to read Gemini response body")?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorBody>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            anyhow::bail!("Gemini HTTP {}: {}", status, message);
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).context("unexpected Gemini response shape")?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No candidates from Gemini"))?;

        let reply: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if reply.trim().is_empty() {
            anyhow::bail!(
                "Gemini returned an empty reply (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
        }
        Ok(reply)
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(prompt).await
    }
}

/// Drop every markdown code fence marker and trim what is left.
pub fn strip_code_fences(s: &str) -> String {
    s.replace("```json", "").replace("```", "").trim().to_string()
}
