// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use verifynow::config::Config;
use verifynow::db::SupabaseDb;
use verifynow::middleware::auth::create_session_jwt;
use verifynow::models::GoogleUser;
use verifynow::routes::create_router;
use verifynow::services::{
    GeminiClient, GoogleIdentityVerifier, ImageAnalysisService, SafeBrowsingClient,
};
use verifynow::AppState;

/// Create a test app with offline/unreachable external dependencies.
///
/// The history store runs in offline mode and the Gemini client points at a
/// closed local port so upstream calls fail fast and deterministically.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let db = SupabaseDb::new_mock();
    let gemini = GeminiClient::with_base_url(
        "test-key".to_string(),
        "http://127.0.0.1:9/v1beta".to_string(),
    )
    .expect("Failed to build Gemini test client");
    let safe_browsing = SafeBrowsingClient::new(None).expect("Failed to build Safe Browsing client");
    let image_analysis = ImageAnalysisService::new(gemini.clone());
    let google_verifier =
        Arc::new(GoogleIdentityVerifier::new(&config).expect("Failed to build identity verifier"));

    let state = Arc::new(AppState {
        config,
        db,
        gemini,
        safe_browsing,
        image_analysis,
        google_verifier,
    });

    (create_router(state.clone()), state)
}

/// Mint a session token for a fixed test user.
#[allow(dead_code)]
pub fn test_session_token(signing_key: &[u8]) -> String {
    let user = GoogleUser {
        id: "test-user-1".to_string(),
        email: "test@example.com".to_string(),
        name: Some("Test User".to_string()),
        picture: None,
    };
    create_session_jwt(&user, signing_key).expect("Failed to create session token")
}
