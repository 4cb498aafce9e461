// promptclean-core/src/pipeline.rs
//! The pipeline orchestrator.
//!
//! A [`Pipeline`] owns its compiled stages and runs them strictly in order:
//! PII → code → gate → normalizer → profanity. Before the first stage the
//! raw input goes through [`Normalizer::clean`], so the rules match the same
//! characters the normalizer will later emit. It is built once by a
//! [`PipelineBuilder`], which fails fast on any configuration problem, and
//! is then immutable and safe to share across threads.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info};
use std::fmt;
use std::sync::Arc;

use crate::classifier::Classifier;
use crate::config::{PipelineConfig, CODE_TOKEN, PROFANITY_MASK, SENSITIVE_SENTINEL};
use crate::errors::PromptCleanError;
use crate::report::SanitizeReport;
use crate::stage::Stage;
use crate::stages::{ClassifierGate, CodeRedactor, Normalizer, PiiRedactor, ProfanityRedactor};

/// A configured sanitization pipeline.
///
/// `sanitize` is deterministic for a given configuration, with one
/// exception: the classifier. If the injected classifier is itself
/// non-deterministic (a sampled model, a remote service that changes
/// versions), the same input can be flagged on one call and not the next.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    cleaner: Normalizer,
    config: PipelineConfig,
    rules_fingerprint: String,
}

impl Pipeline {
    /// Builds a pipeline that consults `classifier` at the gate.
    pub fn new(config: PipelineConfig, classifier: Arc<dyn Classifier>) -> Result<Self, PromptCleanError> {
        PipelineBuilder::new(config).classifier(classifier).build()
    }

    pub fn builder(config: PipelineConfig) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    /// Sanitizes one text. Total: never fails for any input.
    pub fn sanitize(&self, raw: &str) -> String {
        self.sanitize_with_report(raw).output
    }

    /// Sanitizes one text and returns what each stage did.
    pub fn sanitize_with_report(&self, raw: &str) -> SanitizeReport {
        let mut report = SanitizeReport::new(&self.rules_fingerprint);
        let mut text = self.cleaner.clean(raw);
        for stage in &self.stages {
            text = stage.apply(text, &mut report);
            debug!("Stage '{}' done; {} chars remain.", stage.name(), text.chars().count());
        }
        report.output = text;
        report
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Hex SHA-256 of the rule tables this pipeline was built from.
    pub fn rules_fingerprint(&self) -> &str {
        &self.rules_fingerprint
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("rules_fingerprint", &self.rules_fingerprint)
            .finish()
    }
}

/// Validates configuration and assembles the stages.
pub struct PipelineBuilder {
    config: PipelineConfig,
    classifier: Option<Arc<dyn Classifier>>,
    skip_classifier: bool,
}

impl PipelineBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            classifier: None,
            skip_classifier: false,
        }
    }

    pub fn classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Builds without a classifier. The gate reports `Skipped` on every call.
    pub fn skip_classifier(mut self) -> Self {
        self.skip_classifier = true;
        self
    }

    pub fn build(self) -> Result<Pipeline, PromptCleanError> {
        let config = self.config;
        config.validate()?;

        let pii = PiiRedactor::new(&config.rules.pii_rules)?;
        let code = CodeRedactor::new(&config.rules.code_rules)?;
        let profanity = ProfanityRedactor::new(&config.rules.denylist)?;

        let mut protected = pii.compiled_rules().tokens();
        protected.extend([
            CODE_TOKEN.to_string(),
            SENSITIVE_SENTINEL.to_string(),
            PROFANITY_MASK.to_string(),
        ]);
        pii.compiled_rules().check_fixed_points(&protected)?;
        code.compiled_rules().check_fixed_points(&protected)?;
        profanity.check_fixed_points(&protected)?;

        let gate = match (self.classifier, self.skip_classifier) {
            (_, true) => ClassifierGate::bypassed(&config.gate),
            (Some(classifier), false) => {
                info!(
                    "Sensitivity gate uses classifier '{}' (label '{}', threshold {}, {}).",
                    classifier.name(),
                    config.gate.sensitive_label,
                    config.gate.threshold,
                    config.gate.failure_policy
                );
                ClassifierGate::new(classifier, &config.gate)
            }
            (None, false) => {
                return Err(PromptCleanError::InvalidConfig(
                    "no classifier supplied; call skip_classifier() to bypass the gate".to_string(),
                ))
            }
        };
        let normalizer = Normalizer::new(&config.normalizer);
        let cleaner = normalizer.clone();

        let rules_fingerprint = config.rules.fingerprint()?;
        info!(
            "Pipeline ready: {} PII rules, {} code rules, {} denylist terms, max length {} (rules {}).",
            pii.compiled_rules().len(),
            code.compiled_rules().len(),
            config.rules.denylist.len(),
            normalizer.max_length(),
            &rules_fingerprint[..12]
        );

        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(pii),
            Box::new(code),
            Box::new(gate),
            Box::new(normalizer),
            Box::new(profanity),
        ];

        Ok(Pipeline {
            stages,
            cleaner,
            config,
            rules_fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::FixedClassifier;
    use crate::config::{FailurePolicy, PatternRule};

    fn config() -> PipelineConfig {
        PipelineConfig::with_default_rules(FailurePolicy::FailOpen).unwrap()
    }

    #[test]
    fn test_stage_order() {
        let pipeline = Pipeline::builder(config()).skip_classifier().build().unwrap();
        assert_eq!(pipeline.stage_names(), vec!["pii", "code", "gate", "normalizer", "profanity"]);
    }

    #[test]
    fn test_missing_classifier_is_a_construction_error() {
        let result = Pipeline::builder(config()).build();
        assert!(matches!(result, Err(PromptCleanError::InvalidConfig(_))));
    }

    #[test]
    fn test_rule_that_eats_tokens_is_rejected() {
        let mut config = config();
        config.rules.code_rules.push(PatternRule::new("brackets", "MARKUP", r"\[[a-z_]+\]"));
        let result = Pipeline::new(config, Arc::new(FixedClassifier::verdict("POSITIVE", 0.1)));
        assert!(result.is_err());
    }

    #[test]
    fn test_rules_match_cleaned_input() {
        let pipeline = Pipeline::builder(config()).skip_classifier().build().unwrap();
        assert_eq!(pipeline.sanitize("card 4111\t1111\t1111\t1111"), "card [REDACTED_CREDIT_CARD]");
        assert_eq!(pipeline.sanitize("ex\u{7}ec('x')"), "[REDACTED_CODE]'x')");
    }

    #[test]
    fn test_pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }
}
