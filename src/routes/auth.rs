// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google login and session token routes.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_jwt, verify_session_jwt};
use crate::models::SessionUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/google-login", post(google_login))
        .route("/api/verify-token", post(verify_token))
}

#[derive(Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    /// Session JWT for subsequent authenticated calls (2 hour validity)
    pub token: String,
    pub user: SessionUser,
}

/// Exchange a verified Google ID token for a session JWT.
async fn google_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<Json<LoginResponse>> {
    let id_token = req
        .id_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing ID token".to_string()))?;

    let google_user = state
        .google_verifier
        .verify_id_token(&id_token)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Google login rejected");
            AppError::InvalidToken
        })?;

    let token = create_session_jwt(&google_user, &state.config.jwt_secret_key)?;

    tracing::info!(user_id = %google_user.id, "Login success");

    Ok(Json(LoginResponse {
        message: "Login success".to_string(),
        token,
        user: SessionUser::from(&google_user),
    }))
}

#[derive(Deserialize)]
pub struct VerifyTokenRequest {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub user: SessionUser,
}

/// Check a session JWT and echo back the identity it carries.
async fn verify_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyTokenRequest>,
) -> Result<Json<VerifyTokenResponse>> {
    let token = req
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No token provided".to_string()))?;

    let claims = verify_session_jwt(&token, &state.config.jwt_secret_key)?;

    Ok(Json(VerifyTokenResponse {
        valid: true,
        user: SessionUser {
            id: claims.id,
            email: claims.email,
            name: claims.name,
            image: claims.picture,
        },
    }))
}
