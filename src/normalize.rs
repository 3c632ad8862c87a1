// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Verdict normalization: locate a JSON object in free-form model output and
//! complete it to the canonical schema.
//!
//! Models are asked for bare JSON but routinely wrap it in prose or a fenced
//! code block, or drop fields. `normalize` never fails: a missing or
//! unparsable object synthesizes a fallback record, and defaulting runs
//! unconditionally so a partially well-formed response still comes back
//! schema-complete.

use crate::models::verdict::{Verdict, VerdictRecord};
use serde::Deserialize;

/// Fallback summaries are cut to this many characters.
const FALLBACK_SUMMARY_CHARS: usize = 300;

/// Confidence assigned when the model omitted the field.
pub const DEFAULT_CONFIDENCE: u8 = 75;

/// Proof line used when no JSON object could be recovered at all.
const FALLBACK_PROOF: &str = "Analysis completed";

/// Per-endpoint defaults for fields a parsed object left out.
#[derive(Debug, Clone, Copy)]
pub struct FieldDefaults {
    pub summary: &'static str,
    pub proof: &'static str,
}

pub const TEXT_DEFAULTS: FieldDefaults = FieldDefaults {
    summary: "Analysis completed",
    proof: "Content analyzed",
};

pub const IMAGE_DEFAULTS: FieldDefaults = FieldDefaults {
    summary: "Image analysis completed",
    proof: "Visual content analyzed",
};

pub const LINK_DEFAULTS: FieldDefaults = FieldDefaults {
    summary: "URL analysis completed",
    proof: "Domain and safety analyzed",
};

/// Verdict fields as the model may emit them, all optional.
#[derive(Debug, Default, Deserialize)]
struct RawVerdict {
    verdict: Option<String>,
    summary: Option<String>,
    proofs: Option<Vec<String>>,
    confidence: Option<i64>,
    safety_status: Option<String>,
}

/// Normalize raw model output into a schema-complete verdict record.
pub fn normalize(raw: &str, defaults: FieldDefaults) -> VerdictRecord {
    let parsed = extract_candidate(raw).and_then(|candidate| {
        serde_json::from_str::<RawVerdict>(candidate)
            .map_err(|e| tracing::debug!(error = %e, "Model output candidate was not valid JSON"))
            .ok()
    });

    match parsed {
        Some(fields) => complete(fields, defaults),
        None => complete(fallback_fields(raw), defaults),
    }
}

/// Synthesized fields when no JSON object could be recovered.
fn fallback_fields(raw: &str) -> RawVerdict {
    RawVerdict {
        verdict: None,
        summary: Some(truncate_with_ellipsis(raw, FALLBACK_SUMMARY_CHARS)),
        proofs: Some(vec![FALLBACK_PROOF.to_string()]),
        confidence: None,
        safety_status: None,
    }
}

/// Fill every missing field with its default. Defaulting is presence-based:
/// an explicit `confidence: 0` from the model is preserved.
fn complete(fields: RawVerdict, defaults: FieldDefaults) -> VerdictRecord {
    let verdict = fields
        .verdict
        .as_deref()
        .map(Verdict::parse)
        .unwrap_or_default();

    let summary = match fields.summary {
        Some(s) if !s.trim().is_empty() => s,
        _ => defaults.summary.to_string(),
    };

    let proofs = match fields.proofs {
        Some(p) if !p.is_empty() => p,
        _ => vec![defaults.proof.to_string()],
    };

    let confidence = fields
        .confidence
        .map(|c| c.clamp(0, 100) as u8)
        .unwrap_or(DEFAULT_CONFIDENCE);

    VerdictRecord {
        verdict,
        summary,
        proofs,
        confidence,
        safety_status: fields.safety_status,
        safety_check: None,
        image_analysis: None,
    }
}

/// Locate the JSON object candidate: an object inside a ```json fence wins,
/// otherwise the first balanced top-level object anywhere in the text.
fn extract_candidate(text: &str) -> Option<&str> {
    fenced_block(text)
        .and_then(balanced_object_span)
        .or_else(|| balanced_object_span(text))
}

/// Content of the first ```json fenced code block, if any.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// First balanced `{...}` span, tracking strings and escapes so braces in
/// string values don't end the scan early.
fn balanced_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Cut to `limit` characters, appending an ellipsis marker when truncated.
fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(limit).collect();
        cut.push_str("...");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_json_and_preserves_fields() {
        let raw = concat!(
            "Here is my analysis:\n",
            "```json\n",
            "{\"verdict\":\"Fake\",\"summary\":\"Staged photos claim\",",
            "\"proofs\":[\"NASA telemetry\",\"Independent tracking\"],\"confidence\":90}\n",
            "```\n",
            "Let me know if you need more."
        );

        let record = normalize(raw, TEXT_DEFAULTS);

        assert_eq!(record.verdict, Verdict::Fake);
        assert_eq!(record.summary, "Staged photos claim");
        assert_eq!(record.proofs.len(), 2);
        assert_eq!(record.confidence, 90);
    }

    #[test]
    fn extracts_bare_object_from_prose() {
        let raw = "Sure! {\"verdict\":\"Real\",\"summary\":\"Checks out\",\"proofs\":[\"Source A\"],\"confidence\":80} hope that helps";

        let record = normalize(raw, TEXT_DEFAULTS);

        assert_eq!(record.verdict, Verdict::Real);
        assert_eq!(record.confidence, 80);
    }

    #[test]
    fn braces_inside_strings_do_not_end_the_span() {
        let raw = r#"{"verdict":"Misleading","summary":"Uses {curly} notation \" quoted","proofs":["p"],"confidence":60}"#;

        let record = normalize(raw, TEXT_DEFAULTS);

        assert_eq!(record.verdict, Verdict::Misleading);
        assert_eq!(record.summary, "Uses {curly} notation \" quoted");
    }

    #[test]
    fn no_json_synthesizes_fallback() {
        let raw = "I could not produce structured output for this claim.";

        let record = normalize(raw, TEXT_DEFAULTS);

        assert_eq!(record.verdict, Verdict::Unverified);
        assert_eq!(record.summary, raw);
        assert_eq!(record.proofs, vec!["Analysis completed".to_string()]);
        assert_eq!(record.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn long_fallback_summary_is_truncated_with_ellipsis() {
        let raw = "a".repeat(450);

        let record = normalize(&raw, TEXT_DEFAULTS);

        assert_eq!(record.summary.chars().count(), FALLBACK_SUMMARY_CHARS + 3);
        assert!(record.summary.ends_with("..."));
    }

    #[test]
    fn short_fallback_summary_keeps_full_text() {
        let raw = "short answer";
        let record = normalize(raw, TEXT_DEFAULTS);
        assert_eq!(record.summary, "short answer");
    }

    #[test]
    fn partial_object_is_completed_with_defaults() {
        let raw = r#"{"verdict":"Real"}"#;

        let record = normalize(raw, IMAGE_DEFAULTS);

        assert_eq!(record.verdict, Verdict::Real);
        assert_eq!(record.summary, "Image analysis completed");
        assert_eq!(record.proofs, vec!["Visual content analyzed".to_string()]);
        assert_eq!(record.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn explicit_zero_confidence_is_preserved() {
        let raw = r#"{"verdict":"Unverified","summary":"No sources found","proofs":["n/a"],"confidence":0}"#;

        let record = normalize(raw, TEXT_DEFAULTS);

        assert_eq!(record.confidence, 0);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let record = normalize(r#"{"confidence":250}"#, TEXT_DEFAULTS);
        assert_eq!(record.confidence, 100);

        let record = normalize(r#"{"confidence":-5}"#, TEXT_DEFAULTS);
        assert_eq!(record.confidence, 0);
    }

    #[test]
    fn unknown_verdict_string_becomes_unverified() {
        let record = normalize(
            r#"{"verdict":"Probably true","summary":"s","proofs":["p"],"confidence":50}"#,
            TEXT_DEFAULTS,
        );
        assert_eq!(record.verdict, Verdict::Unverified);
    }

    #[test]
    fn empty_proofs_list_gets_default_entry() {
        let record = normalize(
            r#"{"verdict":"Real","summary":"s","proofs":[],"confidence":70}"#,
            LINK_DEFAULTS,
        );
        assert_eq!(record.proofs, vec!["Domain and safety analyzed".to_string()]);
    }

    #[test]
    fn safety_status_passes_through() {
        let record = normalize(
            r#"{"verdict":"Real","summary":"s","proofs":["p"],"confidence":85,"safety_status":"Safe"}"#,
            LINK_DEFAULTS,
        );
        assert_eq!(record.safety_status.as_deref(), Some("Safe"));
    }

    #[test]
    fn invalid_json_in_fence_falls_back() {
        let raw = "```json\n{not valid json}\n```";

        let record = normalize(raw, TEXT_DEFAULTS);

        assert_eq!(record.verdict, Verdict::Unverified);
        assert_eq!(record.proofs, vec!["Analysis completed".to_string()]);
    }
}
