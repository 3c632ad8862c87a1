// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Diagnostic endpoints for checking upstream connectivity.

use axum::{
    extract::{Multipart, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::routes::verify::{read_image_field, write_temp_upload};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/test-gemini", get(test_gemini))
        .route("/api/test-ocr", post(test_ocr))
}

#[derive(Serialize)]
pub struct TestGeminiResponse {
    pub status: String,
    pub response: String,
}

/// Round-trip a trivial prompt through the model fallback chain.
async fn test_gemini(State(state): State<Arc<AppState>>) -> Result<Json<TestGeminiResponse>> {
    let prompt =
        "Respond with this exact JSON: {'status': 'working', 'message': 'Gemini is functioning correctly'}";
    let response = state.gemini.generate_any(prompt).await?;

    Ok(Json(TestGeminiResponse {
        status: "success".to_string(),
        response,
    }))
}

#[derive(Serialize)]
pub struct TestOcrResponse {
    pub extracted_text: String,
    pub status: String,
}

/// Run the image description ladder against an uploaded image.
async fn test_ocr(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TestOcrResponse>> {
    let data = read_image_field(multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("No image provided".to_string()))?;

    let tmp = write_temp_upload(&data).await?;
    let extracted_text = state.image_analysis.describe(tmp.path()).await;

    Ok(Json(TestOcrResponse {
        extracted_text,
        status: "success".to_string(),
    }))
}
