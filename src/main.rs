// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! VerifyNow API Server
//!
//! Backend for the VerifyNow fact-checking frontend: Google login, text,
//! image, and link verification via Gemini and Safe Browsing, with per-user
//! history in Supabase.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verifynow::{
    config::Config,
    db::SupabaseDb,
    services::{GeminiClient, GoogleIdentityVerifier, ImageAnalysisService, SafeBrowsingClient},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting VerifyNow API");

    // History store (optional; offline mode without Supabase credentials)
    let db = SupabaseDb::new(&config).expect("Failed to initialize history store");

    let gemini =
        GeminiClient::new(config.gemini_api_key.clone()).expect("Failed to initialize Gemini client");

    let safe_browsing = SafeBrowsingClient::new(config.safe_browsing_api_key.clone())
        .expect("Failed to initialize Safe Browsing client");
    if config.safe_browsing_api_key.is_none() {
        tracing::warn!("Safe Browsing API key not set; URL safety checks will report unknown");
    }

    let image_analysis = ImageAnalysisService::new(gemini.clone());

    let google_verifier = Arc::new(
        GoogleIdentityVerifier::new(&config).expect("Failed to initialize Google identity verifier"),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        gemini,
        safe_browsing,
        image_analysis,
        google_verifier,
    });

    // Build router
    let app = verifynow::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("verifynow=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
