// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! VerifyNow: fact-check text, images, and links with AI assistance
//!
//! This crate provides the backend API for the VerifyNow frontend: Google
//! login, verification endpoints backed by Gemini and Safe Browsing, and a
//! per-user verification history stored in Supabase.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod services;

use config::Config;
use db::SupabaseDb;
use services::{GeminiClient, GoogleIdentityVerifier, ImageAnalysisService, SafeBrowsingClient};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SupabaseDb,
    pub gemini: GeminiClient,
    pub safe_browsing: SafeBrowsingClient,
    pub image_analysis: ImageAnalysisService,
    pub google_verifier: Arc<GoogleIdentityVerifier>,
}
