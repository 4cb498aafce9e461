// promptclean-core/src/report.rs
//! Reporting types produced alongside the sanitized text, and logging
//! helpers that keep matched originals out of debug logs.
//!
//! A [`SanitizeReport`] never carries the original matched text: it is safe
//! to write to disk or ship to a dashboard.

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::FailurePolicy;

/// Initialized once. When set, debug logs show originals instead of masks.
static PII_DEBUG_ALLOWED: Lazy<bool> = Lazy::new(|| {
    std::env::var("PROMPTCLEAN_ALLOW_DEBUG_PII")
        .map(|s| s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

/// Per-rule redaction counts for one sanitize call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionSummaryItem {
    pub rule_name: String,
    /// "pii", "code" or "profanity".
    pub stage: String,
    pub token: String,
    pub occurrences: usize,
}

/// What the sensitivity gate decided for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    /// The gate has not run yet.
    NotRun,
    /// Verdict below threshold or not the sensitive label.
    Passed { label: String, score: f64 },
    /// The whole text was replaced with the sentinel.
    Flagged { label: String, score: f64 },
    /// The classifier failed; the configured policy decided.
    Fallback { policy: FailurePolicy, error: String },
    /// The pipeline was built without a classifier.
    Skipped,
}

impl GateOutcome {
    /// True when the sentinel replaced the text.
    pub fn replaced_text(&self) -> bool {
        matches!(
            self,
            GateOutcome::Flagged { .. }
                | GateOutcome::Fallback {
                    policy: FailurePolicy::FailClosed,
                    ..
                }
        )
    }
}

/// The sanitized text plus everything the stages recorded on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizeReport {
    pub output: String,
    pub redactions: Vec<RedactionSummaryItem>,
    pub gate: GateOutcome,
    /// True when the normalizer cut the text at `max_length`.
    pub truncated: bool,
    /// Hex SHA-256 of the rule set that produced this output.
    pub rules_fingerprint: String,
}

impl SanitizeReport {
    pub(crate) fn new(rules_fingerprint: &str) -> Self {
        Self {
            output: String::new(),
            redactions: Vec::new(),
            gate: GateOutcome::NotRun,
            truncated: false,
            rules_fingerprint: rules_fingerprint.to_string(),
        }
    }

    /// Adds `occurrences` to the entry for `rule_name`, creating it if needed.
    pub(crate) fn record(&mut self, stage: &str, rule_name: &str, token: &str, occurrences: usize) {
        if occurrences == 0 {
            return;
        }
        match self
            .redactions
            .iter_mut()
            .find(|item| item.stage == stage && item.rule_name == rule_name)
        {
            Some(item) => item.occurrences += occurrences,
            None => self.redactions.push(RedactionSummaryItem {
                rule_name: rule_name.to_string(),
                stage: stage.to_string(),
                token: token.to_string(),
                occurrences,
            }),
        }
    }

    /// Total redactions across every stage.
    pub fn total_redactions(&self) -> usize {
        self.redactions.iter().map(|item| item.occurrences).sum()
    }

    pub fn occurrences_for(&self, rule_name: &str) -> usize {
        self.redactions
            .iter()
            .filter(|item| item.rule_name == rule_name)
            .map(|item| item.occurrences)
            .sum()
    }
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

fn get_loggable_content(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub fn log_captured_match_debug(module_path: &str, rule_name: &str, original_sensitive_content: &str) {
    debug!(
        "{} Captured match for rule '{}' (original): '{}'",
        module_path,
        rule_name,
        get_loggable_content(original_sensitive_content)
    );
}

pub fn log_redaction_action_debug(
    module_path: &str,
    original_sensitive_content: &str,
    sanitized_replacement: &str,
    rule_name: &str,
) {
    debug!(
        "{} Redaction action: Original='{}', Redacted='{}' for rule '{}'",
        module_path,
        get_loggable_content(original_sensitive_content),
        sanitized_replacement,
        rule_name
    );
}
