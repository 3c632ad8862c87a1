// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase REST client for the verification history store.
//!
//! History is append-only: independent single-row inserts with no
//! idempotency key, listed most-recent-first. The store is optional; without
//! Supabase credentials the client runs in offline mode, where writes are
//! dropped with a log line and reads return nothing.

use crate::config::Config;
use crate::db::tables;
use crate::error::AppError;
use crate::models::{HistoryRow, NewHistoryEntry};
use anyhow::Context;
use std::time::Duration;

const DB_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of history entries returned by a listing.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
/// Hard cap on a caller-supplied listing limit.
pub const MAX_HISTORY_LIMIT: u32 = 200;

/// Supabase database client.
#[derive(Clone)]
pub struct SupabaseDb {
    conn: Option<SupabaseConn>,
}

#[derive(Clone)]
struct SupabaseConn {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseDb {
    /// Create a client from config. Missing credentials select offline mode.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let (Some(url), Some(key)) = (
            config.supabase_url.as_ref(),
            config.supabase_service_role_key.as_ref(),
        ) else {
            tracing::warn!("Supabase not configured; verification history disabled");
            return Ok(Self { conn: None });
        };

        let http = reqwest::Client::builder()
            .timeout(DB_TIMEOUT)
            .build()
            .context("failed building Supabase HTTP client")?;

        tracing::info!(url = %url, "Supabase history store configured");

        Ok(Self {
            conn: Some(SupabaseConn {
                http,
                base_url: url.clone(),
                service_key: key.clone(),
            }),
        })
    }

    /// Create an offline client for testing.
    pub fn new_mock() -> Self {
        Self { conn: None }
    }

    fn conn(&self) -> Result<&SupabaseConn, AppError> {
        self.conn
            .as_ref()
            .ok_or_else(|| AppError::Database("history store not configured".to_string()))
    }

    /// Append one history row. The caller logs failures; they never affect
    /// an HTTP response.
    pub async fn insert_history(&self, entry: &NewHistoryEntry) -> Result<(), AppError> {
        let conn = self.conn()?;
        let url = format!(
            "{}/rest/v1/{}",
            conn.base_url,
            tables::VERIFICATION_HISTORY
        );

        let response = conn
            .http
            .post(&url)
            .header("apikey", &conn.service_key)
            .bearer_auth(&conn.service_key)
            .header("Prefer", "return=minimal")
            .json(entry)
            .send()
            .await
            .map_err(|e| AppError::Database(format!("history insert failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Database(format!(
                "history insert returned {status}: {body}"
            )));
        }

        Ok(())
    }

    /// List a user's most recent entries, newest first, at most `limit` rows.
    pub async fn list_history(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<HistoryRow>, AppError> {
        let conn = self.conn()?;
        let url = format!(
            "{}/rest/v1/{}",
            conn.base_url,
            tables::VERIFICATION_HISTORY
        );

        let response = conn
            .http
            .get(&url)
            .header("apikey", &conn.service_key)
            .bearer_auth(&conn.service_key)
            .query(&list_query(user_id, limit))
            .send()
            .await
            .map_err(|e| AppError::Database(format!("history query failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Database(format!(
                "history query returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("invalid history rows: {e}")))
    }
}

/// PostgREST query parameters for a user's history listing.
fn list_query(user_id: &str, limit: u32) -> Vec<(&'static str, String)> {
    let limit = clamp_limit(limit);
    vec![
        ("select", "*".to_string()),
        ("user_id", format!("eq.{user_id}")),
        ("order", "created_at.desc".to_string()),
        ("limit", limit.to_string()),
    ]
}

/// Clamp a caller-supplied limit into [1, MAX_HISTORY_LIMIT].
pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_HISTORY_LIMIT)
}
