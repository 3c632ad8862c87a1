// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Verification history listing for authenticated users.

use axum::{
    extract::{Extension, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::supabase::DEFAULT_HISTORY_LIMIT;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::HistoryItem;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/verification-history", get(get_history))
}

#[derive(Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    limit: Option<u32>,
}

/// List the caller's most recent verifications, newest first.
///
/// An unreachable history store yields an empty list, not an error.
async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryItem>>> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);

    tracing::debug!(user_id = %user.id, limit, "Fetching verification history");

    let rows = match state.db.list_history(&user.id, limit).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to fetch verification history");
            Vec::new()
        }
    };

    Ok(Json(rows.into_iter().map(HistoryItem::from).collect()))
}
