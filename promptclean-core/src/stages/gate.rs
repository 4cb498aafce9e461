// promptclean-core/src/stages/gate.rs
//! The sensitivity gate: an all-or-nothing decision on the whole text.

use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;

use crate::classifier::Classifier;
use crate::config::{FailurePolicy, GateConfig, SENSITIVE_SENTINEL};
use crate::report::{GateOutcome, SanitizeReport};
use crate::stage::Stage;

/// Replaces the text with [`SENSITIVE_SENTINEL`] when the classifier says
/// `sensitive_label` with a score strictly above `threshold`.
///
/// Classifier errors and out-of-range scores resolve through the configured
/// [`FailurePolicy`]; they never propagate.
pub struct ClassifierGate {
    classifier: Option<Arc<dyn Classifier>>,
    sensitive_label: String,
    threshold: f64,
    failure_policy: FailurePolicy,
}

impl ClassifierGate {
    pub fn new(classifier: Arc<dyn Classifier>, config: &GateConfig) -> Self {
        Self {
            classifier: Some(classifier),
            sensitive_label: config.sensitive_label.clone(),
            threshold: config.threshold,
            failure_policy: config.failure_policy,
        }
    }

    /// A gate that never calls a classifier. Every call reports `Skipped`.
    pub fn bypassed(config: &GateConfig) -> Self {
        warn!("Sensitivity gate is bypassed: no classifier will be consulted.");
        Self {
            classifier: None,
            sensitive_label: config.sensitive_label.clone(),
            threshold: config.threshold,
            failure_policy: config.failure_policy,
        }
    }

    fn decide(&self, classifier: &dyn Classifier, text: &str) -> GateOutcome {
        match classifier.classify(text).and_then(|v| v.checked()) {
            Ok(verdict) if verdict.label == self.sensitive_label && verdict.score > self.threshold => {
                info!(
                    "Classifier '{}' flagged text as {} (threshold {}).",
                    classifier.name(),
                    verdict,
                    self.threshold
                );
                GateOutcome::Flagged {
                    label: verdict.label,
                    score: verdict.score,
                }
            }
            Ok(verdict) => {
                debug!("Classifier '{}' passed text: {}.", classifier.name(), verdict);
                GateOutcome::Passed {
                    label: verdict.label,
                    score: verdict.score,
                }
            }
            Err(e) => {
                warn!(
                    "Classifier '{}' failed ({}); applying {} policy.",
                    classifier.name(),
                    e,
                    self.failure_policy
                );
                GateOutcome::Fallback {
                    policy: self.failure_policy,
                    error: e.to_string(),
                }
            }
        }
    }
}

impl fmt::Debug for ClassifierGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierGate")
            .field("classifier", &self.classifier.as_ref().map(|c| c.name().to_string()))
            .field("sensitive_label", &self.sensitive_label)
            .field("threshold", &self.threshold)
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

impl Stage for ClassifierGate {
    fn name(&self) -> &'static str {
        "gate"
    }

    fn apply(&self, text: String, report: &mut SanitizeReport) -> String {
        let outcome = match &self.classifier {
            Some(classifier) => self.decide(classifier.as_ref(), &text),
            None => GateOutcome::Skipped,
        };
        let replace = outcome.replaced_text();
        report.gate = outcome;
        if replace {
            SENSITIVE_SENTINEL.to_string()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::FixedClassifier;
    use crate::errors::ClassifierError;

    fn run(classifier: FixedClassifier, policy: FailurePolicy, text: &str) -> (String, GateOutcome) {
        let gate = ClassifierGate::new(Arc::new(classifier), &GateConfig::new(policy));
        let mut report = SanitizeReport::new("");
        let out = gate.apply(text.to_string(), &mut report);
        (out, report.gate)
    }

    #[test]
    fn test_confident_sensitive_verdict_replaces_text() {
        let (out, outcome) = run(FixedClassifier::verdict("NEGATIVE", 0.95), FailurePolicy::FailOpen, "secret plans");
        assert_eq!(out, SENSITIVE_SENTINEL);
        assert!(matches!(outcome, GateOutcome::Flagged { .. }));
    }

    #[test]
    fn test_score_at_threshold_passes() {
        let (out, outcome) = run(FixedClassifier::verdict("NEGATIVE", 0.9), FailurePolicy::FailClosed, "meh");
        assert_eq!(out, "meh");
        assert!(matches!(outcome, GateOutcome::Passed { .. }));
    }

    #[test]
    fn test_other_label_passes_regardless_of_score() {
        let (out, _) = run(FixedClassifier::verdict("POSITIVE", 0.999), FailurePolicy::FailClosed, "great");
        assert_eq!(out, "great");
    }

    #[test]
    fn test_label_match_is_case_sensitive() {
        let (out, _) = run(FixedClassifier::verdict("negative", 0.999), FailurePolicy::FailOpen, "hmm");
        assert_eq!(out, "hmm");
    }

    #[test]
    fn test_fail_open_passes_on_error() {
        let failing = FixedClassifier::failing(ClassifierError::Unavailable("no model".into()));
        let (out, outcome) = run(failing, FailurePolicy::FailOpen, "hello");
        assert_eq!(out, "hello");
        assert!(matches!(outcome, GateOutcome::Fallback { policy: FailurePolicy::FailOpen, .. }));
    }

    #[test]
    fn test_fail_closed_flags_on_error() {
        let failing = FixedClassifier::failing(ClassifierError::Timeout(50));
        let (out, _) = run(failing, FailurePolicy::FailClosed, "hello");
        assert_eq!(out, SENSITIVE_SENTINEL);
    }

    #[test]
    fn test_out_of_range_score_is_a_failure() {
        let (out, outcome) = run(FixedClassifier::verdict("NEGATIVE", 7.0), FailurePolicy::FailClosed, "x");
        assert_eq!(out, SENSITIVE_SENTINEL);
        assert!(matches!(outcome, GateOutcome::Fallback { .. }));
    }

    #[test]
    fn test_bypassed_gate_reports_skipped() {
        let gate = ClassifierGate::bypassed(&GateConfig::new(FailurePolicy::FailClosed));
        let mut report = SanitizeReport::new("");
        assert_eq!(gate.apply("text".to_string(), &mut report), "text");
        assert_eq!(report.gate, GateOutcome::Skipped);
    }
}
