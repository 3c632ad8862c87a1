// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Success-path tests against a local stand-in for the Gemini API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceExt;
use verifynow::config::Config;
use verifynow::db::SupabaseDb;
use verifynow::routes::create_router;
use verifynow::services::{
    GeminiClient, GoogleIdentityVerifier, ImageAnalysisService, SafeBrowsingClient,
};
use verifynow::AppState;

mod common;

/// Serve a fixed generateContent response on an ephemeral local port and
/// return a base URL for the Gemini client.
async fn spawn_model_stub(reply_text: &'static str) -> String {
    let stub = Router::new().route(
        "/v1beta/models/{model}",
        post(move || async move {
            Json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": reply_text }] }
                }]
            }))
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, stub).await.unwrap();
    });

    format!("http://{addr}/v1beta")
}

fn app_with_model_stub(base_url: String) -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let gemini = GeminiClient::with_base_url("test-key".to_string(), base_url).unwrap();
    let state = Arc::new(AppState {
        db: SupabaseDb::new_mock(),
        safe_browsing: SafeBrowsingClient::new(None).unwrap(),
        image_analysis: ImageAnalysisService::new(gemini.clone()),
        google_verifier: Arc::new(GoogleIdentityVerifier::new(&config).unwrap()),
        gemini,
        config,
    });
    (create_router(state.clone()), state)
}

#[tokio::test]
async fn test_verify_text_with_fenced_model_output() {
    let base_url = spawn_model_stub(
        "```json\n{\"verdict\":\"Fake\",\"summary\":\"The landings are extensively documented.\",\"proofs\":[\"Retroreflectors remain on the surface\"],\"confidence\":90}\n```",
    )
    .await;
    let (app, state) = app_with_model_stub(base_url);
    let token = common::test_session_token(&state.config.jwt_secret_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/verify-text")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"text":"The moon landing was faked"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["verdict"], "Fake");
    assert_eq!(body["confidence"], 90);
    assert_eq!(body["summary"], "The landings are extensively documented.");
    assert_eq!(
        body["proofs"],
        serde_json::json!(["Retroreflectors remain on the surface"])
    );
}

#[tokio::test]
async fn test_verify_text_with_prose_only_model_output() {
    let base_url = spawn_model_stub("I cannot structure this one, sorry.").await;
    let (app, state) = app_with_model_stub(base_url);
    let token = common::test_session_token(&state.config.jwt_secret_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/verify-text")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"text":"Water is wet"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // Unstructured output still normalizes to a complete record with 200
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["verdict"], "Unverified");
    assert_eq!(body["summary"], "I cannot structure this one, sorry.");
    assert_eq!(body["proofs"], serde_json::json!(["Analysis completed"]));
    assert_eq!(body["confidence"], 75);
}

#[tokio::test]
async fn test_verify_link_success_includes_safety_check() {
    let base_url = spawn_model_stub(
        "{\"verdict\":\"Real\",\"summary\":\"Well-known domain.\",\"proofs\":[\"Registered since 1995\"],\"confidence\":85,\"safety_status\":\"Unsafe\"}",
    )
    .await;
    let (app, state) = app_with_model_stub(base_url);
    let token = common::test_session_token(&state.config.jwt_secret_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/verify-link")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"url":"example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["verdict"], "Real");
    assert_eq!(body["safety_status"], "Unsafe");
    // No Safe Browsing key in tests: the check reports unknown, not unsafe
    assert!(body["safety_check"]["error"].as_str().is_some());
    assert!(body["safety_check"].get("safe").is_none());
}
