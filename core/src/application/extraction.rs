// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Investigation Runner (C4) extraction rules. Parses the agent's final
// plain-text message into a structured verdict. The model is asked (via
// the system prompt) to close its answer with labelled sections; this
// module is tolerant of the model skipping or reordering them.

use crate::domain::incident::Confidence;
use once_cell::sync::Lazy;
use regex::Regex;

/// Parsed verdict lifted out of the agent's closing message.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedVerdict {
    pub root_cause: String,
    pub confidence: Confidence,
    pub recommendations: Vec<String>,
}

static ROOT_CAUSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)ROOT CAUSE:\s*(.+?)(?:\n\s*\n|\nCONFIDENCE:|\nEVIDENCE:|\nRECOMMENDATIONS:|$)").unwrap());
static CONFIDENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CONFIDENCE:\s*(high|medium|low)").unwrap());
static RECOMMENDATIONS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)RECOMMENDATIONS:\s*(.+?)(?:\n\s*\n|$)").unwrap()
});
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*[-*\d.•]+\s*(.+)$").unwrap());
static HIGH_CONFIDENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(definitely|certainly|clearly)\b").unwrap());
static LOW_CONFIDENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(possibly|maybe|might)\b").unwrap());

/// Minimum length (post-trim) for a line under `RECOMMENDATIONS:` to count
/// as an actionable recommendation rather than bullet-list noise like a
/// bare "- " or "1." the model emitted without following through.
const MIN_RECOMMENDATION_LEN: usize = 11;

/// Extracts a verdict from the agent's final message text. Falls back to
/// treating the whole message as the root cause when the labelled
/// sections are absent, so an investigation that reaches a final answer
/// always yields *some* verdict (spec invariant: a completed investigation
/// always has a `suggested_root_cause`). Confidence without a `CONFIDENCE:`
/// label is inferred from hedging/certainty language in the text, falling
/// back to `Medium` when neither is present.
pub fn extract_verdict(final_text: &str) -> ExtractedVerdict {
    let root_cause = ROOT_CAUSE_RE
        .captures(final_text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| final_text.trim().to_string());

    let confidence = CONFIDENCE_RE
        .captures(final_text)
        .and_then(|c| c.get(1))
        .map(|m| match m.as_str().to_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            _ => Confidence::Low,
        })
        .unwrap_or_else(|| {
            if HIGH_CONFIDENCE_RE.is_match(final_text) {
                Confidence::High
            } else if LOW_CONFIDENCE_RE.is_match(final_text) {
                Confidence::Low
            } else {
                Confidence::Medium
            }
        });

    let recommendations = RECOMMENDATIONS_RE
        .captures(final_text)
        .and_then(|c| c.get(1))
        .map(|m| {
            BULLET_RE
                .captures_iter(m.as_str())
                .map(|cap| cap[1].trim().to_string())
                .filter(|s| s.len() >= MIN_RECOMMENDATION_LEN)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    ExtractedVerdict {
        root_cause,
        confidence,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_sections() {
        let text = "ROOT CAUSE: pod OOMKilled due to memory limit too low\n\
CONFIDENCE: high\n\
EVIDENCE: logs show OOMKilled events\n\
RECOMMENDATIONS:\n\
- raise memory limit to 512Mi\n\
- add a liveness probe";
        let verdict = extract_verdict(text);
        assert_eq!(
            verdict.root_cause,
            "pod OOMKilled due to memory limit too low"
        );
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(
            verdict.recommendations,
            vec![
                "raise memory limit to 512Mi".to_string(),
                "add a liveness probe".to_string()
            ]
        );
    }

    #[test]
    fn falls_back_to_whole_text_when_unlabelled() {
        let verdict = extract_verdict("the pod ran out of memory");
        assert_eq!(verdict.root_cause, "the pod ran out of memory");
        assert_eq!(verdict.confidence, Confidence::Medium);
        assert!(verdict.recommendations.is_empty());
    }

    #[test]
    fn confidence_is_case_insensitive() {
        let verdict = extract_verdict("ROOT CAUSE: x\nconfidence: MEDIUM");
        assert_eq!(verdict.confidence, Confidence::Medium);
    }

    #[test]
    fn infers_high_confidence_from_certainty_language_when_unlabelled() {
        let verdict = extract_verdict("this is definitely caused by a missing memory limit");
        assert_eq!(verdict.confidence, Confidence::High);
    }

    #[test]
    fn infers_low_confidence_from_hedging_language_when_unlabelled() {
        let verdict = extract_verdict("it might be a noisy neighbor but logs are inconclusive");
        assert_eq!(verdict.confidence, Confidence::Low);
    }

    #[test]
    fn recognizes_bullet_char_and_drops_short_lines() {
        let text = "RECOMMENDATIONS:\n\
• raise the memory limit to 512Mi\n\
- no\n\
• add a liveness probe";
        let verdict = extract_verdict(text);
        assert_eq!(
            verdict.recommendations,
            vec![
                "raise the memory limit to 512Mi".to_string(),
                "add a liveness probe".to_string()
            ]
        );
    }
}
