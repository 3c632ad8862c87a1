// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Verification endpoints: text, image, and link fact-checking.
//!
//! Each endpoint is a strict linear pipeline: auth (handled by middleware),
//! payload validation, gateway call, normalization, fire-and-forget history
//! write, response. Gateway failures degrade to a 500 whose body is still a
//! schema-complete verdict record rather than a bare error.

use axum::{
    extract::{Extension, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{InputType, NewHistoryEntry, SafetyCheck, Verdict, VerdictRecord};
use crate::normalize::{normalize, IMAGE_DEFAULTS, LINK_DEFAULTS, TEXT_DEFAULTS};
use crate::AppState;

/// Image descriptions attached to responses are capped at this length.
const MAX_IMAGE_ANALYSIS_CHARS: usize = 500;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/verify-text", post(verify_text))
        .route("/api/verify-image", post(verify_image))
        .route("/api/verify-link", post(verify_link))
}

// ─── Text ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyTextRequest {
    #[serde(default)]
    text: Option<String>,
}

/// Fact-check a user-submitted statement.
async fn verify_text(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<VerifyTextRequest>,
) -> Result<(StatusCode, Json<VerdictRecord>)> {
    let text = req
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No text provided".to_string()))?;

    let prompt = text_prompt(&text);

    match state.gemini.generate_any(&prompt).await {
        Ok(raw) => {
            let record = normalize(&raw, TEXT_DEFAULTS);
            record_history(&state, &user, InputType::Text, &text, &record);
            Ok((StatusCode::OK, Json(record)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Text verification failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(degraded_record(
                    format!("Verification failed: {e}"),
                    "Technical error during analysis",
                )),
            ))
        }
    }
}

// ─── Image ───────────────────────────────────────────────────

/// Fact-check an uploaded image.
///
/// The upload is written to a request-scoped temporary file which is removed
/// on every exit path (RAII on the `NamedTempFile`).
async fn verify_image(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<VerdictRecord>)> {
    let data = read_image_field(multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("No image uploaded".to_string()))?;

    let tmp = write_temp_upload(&data).await?;

    // OCR-then-vision-then-placeholder; never fails
    let description = state.image_analysis.describe(tmp.path()).await;

    let prompt = image_prompt(&description);

    match state.gemini.generate_any(&prompt).await {
        Ok(raw) => {
            let mut record = normalize(&raw, IMAGE_DEFAULTS);
            record.image_analysis = Some(
                description
                    .chars()
                    .take(MAX_IMAGE_ANALYSIS_CHARS)
                    .collect(),
            );
            record_history(&state, &user, InputType::Image, &description, &record);
            Ok((StatusCode::OK, Json(record)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Image verification failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(degraded_record(
                    format!("Image verification failed: {e}"),
                    "Technical error during processing",
                )),
            ))
        }
    }
}

// ─── Link ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyLinkRequest {
    #[serde(default)]
    url: Option<String>,
}

/// Fact-check a URL: Safe Browsing reputation plus model analysis.
async fn verify_link(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<VerifyLinkRequest>,
) -> Result<(StatusCode, Json<VerdictRecord>)> {
    let url = req
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No URL provided".to_string()))?;

    let url = ensure_scheme(url.trim());

    let safety = state.safe_browsing.check_url(&url).await;
    let safety_verdict = if safety.is_safe() { "Safe" } else { "Unsafe" };

    let prompt = link_prompt(&url, safety_verdict);

    match state.gemini.generate_any(&prompt).await {
        Ok(raw) => {
            let mut record = normalize(&raw, LINK_DEFAULTS);
            record.safety_check = Some(safety);
            record_history(&state, &user, InputType::Link, &url, &record);
            Ok((StatusCode::OK, Json(record)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Link verification failed");
            let mut record = degraded_record(
                format!("Link verification failed: {e}"),
                "Technical error during verification",
            );
            record.safety_check = Some(SafetyCheck::lookup_error(e.to_string()));
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(record)))
        }
    }
}

// ─── Shared helpers ──────────────────────────────────────────

/// Pull the `image` field out of a multipart body.
pub(crate) async fn read_image_field(mut multipart: Multipart) -> Result<Option<Vec<u8>>> {
    let mut image_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid image upload: {e}")))?;
            image_data = Some(bytes.to_vec());
        }
    }

    Ok(image_data)
}

/// Write upload bytes to a temp file that deletes itself on drop.
pub(crate) async fn write_temp_upload(data: &[u8]) -> Result<tempfile::NamedTempFile> {
    let tmp = tempfile::Builder::new()
        .prefix("verify_")
        .suffix(".img")
        .tempfile()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed creating temp file: {e}")))?;

    tokio::fs::write(tmp.path(), data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed writing upload: {e}")))?;

    Ok(tmp)
}

/// Bare domains get an https scheme before any gateway call.
fn ensure_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Schema-complete record for the degraded 500 path.
fn degraded_record(summary: String, proof: &str) -> VerdictRecord {
    VerdictRecord {
        verdict: Verdict::Unverified,
        summary,
        proofs: vec![proof.to_string()],
        confidence: 0,
        safety_status: None,
        safety_check: None,
        image_analysis: None,
    }
}

/// Queue a history write after the response payload is finalized. The
/// outcome never alters the response; failures only show up in logs.
fn record_history(
    state: &Arc<AppState>,
    user: &AuthUser,
    input_type: InputType,
    content: &str,
    record: &VerdictRecord,
) {
    let entry = NewHistoryEntry::from_record(&user.id, input_type, content, record);
    let db = state.db.clone();
    let user_id = user.id.clone();

    tokio::spawn(async move {
        match db.insert_history(&entry).await {
            Ok(()) => tracing::debug!(user_id = %user_id, "Verification history saved"),
            Err(e) => tracing::warn!(user_id = %user_id, error = %e, "Failed to save verification history"),
        }
    });
}

// ─── Prompts ─────────────────────────────────────────────────

fn text_prompt(text: &str) -> String {
    format!(
        "You are a fact-checking assistant. Analyze this statement and respond ONLY with valid JSON:\n\
         {{\"verdict\":\"Real\"|\"Fake\"|\"Misleading\"|\"Unverified\",\"summary\":\"Brief analysis...\",\"proofs\":[\"Evidence 1\",\"Evidence 2\"],\"confidence\":85}}\n\
         \n\
         Statement: \"{text}\""
    )
}

fn image_prompt(description: &str) -> String {
    format!(
        "You are a fact-checking assistant. Analyze this image description and respond ONLY with valid JSON:\n\
         {{\"verdict\":\"Real\"|\"Fake\"|\"Misleading\"|\"Unverified\",\"summary\":\"Brief analysis...\",\"proofs\":[\"Evidence 1\",\"Evidence 2\"],\"confidence\":85}}\n\
         \n\
         Image Description: \"{description}\""
    )
}

fn link_prompt(url: &str, safety_verdict: &str) -> String {
    format!(
        "You are a fact-checking assistant. Analyze this URL and respond ONLY with valid JSON:\n\
         {{\"verdict\":\"Real\"|\"Fake\"|\"Misleading\"|\"Unverified\",\"summary\":\"Brief analysis...\",\"proofs\":[\"Evidence 1\",\"Evidence 2\"],\"confidence\":85,\"safety_status\":\"{safety_verdict}\"}}\n\
         \n\
         URL: {url}\n\
         Safety Status: {safety_verdict}"
    )
}
