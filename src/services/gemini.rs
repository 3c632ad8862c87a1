// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini API client with ordered model fallback.
//!
//! The public API exposes several similarly-named deployments of each model
//! generation and availability varies by key, so generation calls walk a
//! fixed candidate list and take the first non-empty response. Only when
//! every candidate fails does the caller see an error.

use crate::error::AppError;
use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_TIMEOUT: Duration = Duration::from_secs(120);

/// Ordered model identifiers tried for every generation call.
pub const CANDIDATE_MODELS: &[&str] = &[
    "models/gemini-2.5-pro-preview-03-25",
    "models/gemini-2.5-flash-preview-05-20",
    "gemini-2.5-pro-preview-03-25",
    "gemini-2.5-flash-preview-05-20",
];

/// Vision-capable model used for image description.
pub const VISION_MODEL: &str = "models/gemini-2.5-flash-preview-05-20";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a new client with an API key.
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, GEMINI_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL (used by tests).
    pub fn with_base_url(api_key: String, base_url: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(GEMINI_TIMEOUT)
            .build()
            .context("failed building Gemini HTTP client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Generate text, trying each candidate model in order. Per-candidate
    /// failures and empty outputs are logged and skipped.
    pub async fn generate_any(&self, prompt: &str) -> Result<String, AppError> {
        for model in CANDIDATE_MODELS {
            match self.generate_content(model, prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::debug!(model, "Gemini model responded");
                    return Ok(text);
                }
                Ok(_) => tracing::warn!(model, "Gemini model returned empty response"),
                Err(e) => tracing::warn!(model, error = %e, "Gemini model failed"),
            }
        }

        Err(AppError::NoModelAvailable)
    }

    /// Single text generation call against one model.
    pub async fn generate_content(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        self.generate(model, vec![Part::text(prompt)]).await
    }

    /// Describe an image with the vision-capable model.
    pub async fn describe_image(
        &self,
        image_data: &[u8],
        prompt: &str,
    ) -> Result<String, AppError> {
        let parts = vec![
            Part::text(prompt),
            Part::inline_data("image/jpeg", STANDARD.encode(image_data)),
        ];
        self.generate(VISION_MODEL, parts).await
    }

    async fn generate(&self, model: &str, parts: Vec<Part>) -> Result<String, AppError> {
        let url = format!("{}/{}:generateContent", self.base_url, model_path(model));
        let request = GenerateContentRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::GeminiApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GeminiApi(format!(
                "generateContent returned {status}: {body}"
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::GeminiApi(format!("invalid generateContent JSON: {e}")))?;

        body.first_text()
            .ok_or_else(|| AppError::GeminiApi("response contained no text".to_string()))
    }
}

/// Candidate lists mix bare and prefixed identifiers; the REST path always
/// wants the `models/` prefix.
fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    /// Base64-encoded image bytes
    data: String,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline_data(mime_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// First non-empty text part across all candidates.
    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .find(|t| !t.is_empty())
            .map(|t| t.to_string())
    }
}
