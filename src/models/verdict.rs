// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Canonical fact-check verdict schema returned to every verification caller.

use serde::{Deserialize, Serialize};

/// Fact-check verdict classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verdict {
    Real,
    Fake,
    Misleading,
    #[default]
    Unverified,
}

impl Verdict {
    /// Parse a model-emitted verdict string. Anything unrecognized is
    /// Unverified rather than an error.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Real" => Verdict::Real,
            "Fake" => Verdict::Fake,
            "Misleading" => Verdict::Misleading,
            _ => Verdict::Unverified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "Real",
            Verdict::Fake => "Fake",
            Verdict::Misleading => "Misleading",
            Verdict::Unverified => "Unverified",
        }
    }
}

/// Normalized fact-check result.
///
/// Invariant: verdict, summary, proofs, and confidence are always populated;
/// the optional fields are endpoint-specific extras.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub verdict: Verdict,
    pub summary: String,
    pub proofs: Vec<String>,
    pub confidence: u8,
    /// Safety label the model echoes back for link verification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_status: Option<String>,
    /// Structured Safe Browsing result (link verification only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_check: Option<SafetyCheck>,
    /// Extracted image description (image verification only, capped at 500 chars)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_analysis: Option<String>,
}

/// Outcome of a Safe Browsing URL lookup.
///
/// A populated `error` means the lookup itself failed: safety is unknown,
/// not unsafe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyCheck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threats: Option<Vec<ThreatMatch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One flagged threat entry from Safe Browsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatMatch {
    pub threat_type: String,
    pub platform: String,
    pub url: String,
}

impl SafetyCheck {
    /// No threats found.
    pub fn safe() -> Self {
        Self {
            safe: Some(true),
            verdict: Some("Safe".to_string()),
            details: Some("No security threats detected".to_string()),
            threats: Some(Vec::new()),
            error: None,
        }
    }

    /// One or more threat matches.
    pub fn flagged(threats: Vec<ThreatMatch>) -> Self {
        Self {
            safe: Some(false),
            verdict: Some("Unsafe".to_string()),
            details: Some(format!("Found {} security threat(s)", threats.len())),
            threats: Some(threats),
            error: None,
        }
    }

    /// The lookup itself failed; safety is unknown.
    pub fn lookup_error(message: impl Into<String>) -> Self {
        Self {
            safe: None,
            verdict: None,
            details: None,
            threats: None,
            error: Some(message.into()),
        }
    }

    pub fn is_safe(&self) -> bool {
        self.safe == Some(true)
    }
}
