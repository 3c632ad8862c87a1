// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Safe Browsing v4 URL reputation client.
//!
//! Lookups never raise to callers: a transport failure, non-200 status, or
//! missing API key produces a `SafetyCheck` carrying an `error`, which
//! downstream code must treat as "safety unknown", not "unsafe".

use crate::models::{SafetyCheck, ThreatMatch};
use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const SAFE_BROWSING_URL: &str = "https://safebrowsing.googleapis.com/v4/threatMatches:find";
const SAFE_BROWSING_TIMEOUT: Duration = Duration::from_secs(10);

const CLIENT_ID: &str = "verifynow-app";
const CLIENT_VERSION: &str = "1.0.0";

const THREAT_TYPES: &[&str] = &[
    "MALWARE",
    "SOCIAL_ENGINEERING",
    "UNWANTED_SOFTWARE",
    "POTENTIALLY_HARMFUL_APPLICATION",
];

/// Safe Browsing API client.
#[derive(Clone)]
pub struct SafeBrowsingClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl SafeBrowsingClient {
    /// Create a new client. Without an API key every lookup reports
    /// "safety unknown".
    pub fn new(api_key: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(SAFE_BROWSING_TIMEOUT)
            .build()
            .context("failed building Safe Browsing HTTP client")?;

        Ok(Self {
            http,
            api_url: SAFE_BROWSING_URL.to_string(),
            api_key,
        })
    }

    /// Check a URL against all configured threat categories.
    pub async fn check_url(&self, url: &str) -> SafetyCheck {
        let Some(api_key) = &self.api_key else {
            return SafetyCheck::lookup_error("Safe Browsing API key not configured");
        };

        match self.find_threat_matches(api_key, url).await {
            Ok(matches) if matches.is_empty() => SafetyCheck::safe(),
            Ok(matches) => SafetyCheck::flagged(
                matches
                    .into_iter()
                    .map(|m| m.into_threat(url))
                    .collect(),
            ),
            Err(e) => {
                tracing::warn!(url, error = %e, "Safe Browsing lookup failed");
                SafetyCheck::lookup_error(format!("Safe Browsing check failed: {e}"))
            }
        }
    }

    async fn find_threat_matches(
        &self,
        api_key: &str,
        url: &str,
    ) -> anyhow::Result<Vec<RawThreatMatch>> {
        let payload = json!({
            "client": {
                "clientId": CLIENT_ID,
                "clientVersion": CLIENT_VERSION,
            },
            "threatInfo": {
                "threatTypes": THREAT_TYPES,
                "platformTypes": ["ANY_PLATFORM"],
                "threatEntryTypes": ["URL"],
                "threatEntries": [{"url": url}],
            },
        });

        let response = self
            .http
            .post(&self.api_url)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .context("threatMatches request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("API request failed: {}", response.status());
        }

        let body: ThreatMatchesResponse = response
            .json()
            .await
            .context("invalid threatMatches JSON")?;

        Ok(body.matches)
    }
}

#[derive(Debug, Deserialize)]
struct ThreatMatchesResponse {
    #[serde(default)]
    matches: Vec<RawThreatMatch>,
}

#[derive(Debug, Deserialize)]
struct RawThreatMatch {
    #[serde(rename = "threatType")]
    threat_type: Option<String>,
    #[serde(rename = "platformType")]
    platform_type: Option<String>,
    threat: Option<ThreatEntry>,
}

#[derive(Debug, Deserialize)]
struct ThreatEntry {
    url: Option<String>,
}

impl RawThreatMatch {
    /// Convert an API match into the response shape, falling back to the
    /// queried URL when the match omits one.
    fn into_threat(self, queried_url: &str) -> ThreatMatch {
        ThreatMatch {
            threat_type: self.threat_type.unwrap_or_else(|| "Unknown".to_string()),
            platform: self.platform_type.unwrap_or_else(|| "Unknown".to_string()),
            url: self
                .threat
                .and_then(|t| t.url)
                .unwrap_or_else(|| queried_url.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reports_safety_unknown() {
        let client = SafeBrowsingClient::new(None).unwrap();
        let check = client.check_url("https://example.com").await;

        assert!(check.error.is_some());
        assert!(!check.is_safe());
        assert!(check.safe.is_none());
    }

    #[test]
    fn empty_matches_map_to_safe() {
        let body: ThreatMatchesResponse = serde_json::from_str("{}").unwrap();
        assert!(body.matches.is_empty());
    }

    #[test]
    fn matches_carry_type_platform_and_url() {
        let body: ThreatMatchesResponse = serde_json::from_str(
            r#"{"matches":[{"threatType":"MALWARE","platformType":"ANY_PLATFORM","threat":{"url":"https://evil.example"}}]}"#,
        )
        .unwrap();

        let threat = body
            .matches
            .into_iter()
            .next()
            .unwrap()
            .into_threat("https://queried.example");

        assert_eq!(threat.threat_type, "MALWARE");
        assert_eq!(threat.platform, "ANY_PLATFORM");
        assert_eq!(threat.url, "https://evil.example");
    }

    #[test]
    fn match_without_url_falls_back_to_queried() {
        let raw = RawThreatMatch {
            threat_type: None,
            platform_type: None,
            threat: None,
        };
        let threat = raw.into_threat("https://queried.example");

        assert_eq!(threat.threat_type, "Unknown");
        assert_eq!(threat.url, "https://queried.example");
    }
}
