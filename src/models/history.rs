// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Verification history models for storage and API.

use super::verdict::{SafetyCheck, Verdict, VerdictRecord};
use serde::{Deserialize, Serialize};

/// Stored history rows keep at most this much of the submitted content.
pub const MAX_CONTENT_CHARS: usize = 500;

/// What kind of input a verification ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Image,
    Link,
}

/// Row inserted into the `verification_history` table.
///
/// Append-only and user-owned; never mutated after creation. `created_at`
/// is assigned server-side by the database.
#[derive(Debug, Clone, Serialize)]
pub struct NewHistoryEntry {
    pub user_id: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub content: String,
    pub verdict: Verdict,
    pub summary: String,
    pub proofs: Vec<String>,
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_check: Option<SafetyCheck>,
}

impl NewHistoryEntry {
    /// Build a history row from a finished verification, truncating the
    /// submitted content to the storage cap.
    pub fn from_record(
        user_id: &str,
        input_type: InputType,
        content: &str,
        record: &VerdictRecord,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            input_type,
            content: content.chars().take(MAX_CONTENT_CHARS).collect(),
            verdict: record.verdict,
            summary: record.summary.clone(),
            proofs: record.proofs.clone(),
            confidence: record.confidence,
            safety_check: record.safety_check.clone(),
        }
    }
}

/// Stored row as returned by the history query.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRow {
    /// Row ID assigned by the database (passed through verbatim)
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub confidence: Option<u8>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(rename = "type", default)]
    pub input_type: Option<String>,
}

/// One history entry shaped for the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: serde_json::Value,
    pub verdict: Option<String>,
    pub confidence: u8,
    pub summary: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "inputType")]
    pub input_type: Option<String>,
}

impl From<HistoryRow> for HistoryItem {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            verdict: row.verdict,
            confidence: row.confidence.unwrap_or(0),
            summary: row.summary.unwrap_or_default(),
            created_at: row.created_at,
            input_type: row.input_type,
        }
    }
}
