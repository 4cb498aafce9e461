// File: promptclean-core/src/headless.rs

//! `headless.rs`
//! Convenience wrapper for a full, one-shot sanitization of a string.
//!
//! Long-lived callers should build a [`Pipeline`] once and reuse it; this
//! helper compiles every rule on each call.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::classifier::Classifier;
use crate::config::PipelineConfig;
use crate::pipeline::Pipeline;

/// Builds a pipeline from `config`, sanitizes `content`, and drops the pipeline.
///
/// # Arguments
///
/// * `config` - Rule tables and stage settings.
/// * `classifier` - The gate's classifier. `None` bypasses the gate explicitly.
/// * `content` - The string to be sanitized.
pub fn headless_sanitize_string(
    config: PipelineConfig,
    classifier: Option<Arc<dyn Classifier>>,
    content: &str,
) -> Result<String> {
    let builder = Pipeline::builder(config);
    let builder = match classifier {
        Some(classifier) => builder.classifier(classifier),
        None => builder.skip_classifier(),
    };
    let pipeline = builder.build().context("Failed to build sanitization pipeline")?;
    Ok(pipeline.sanitize(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::FixedClassifier;
    use crate::config::{FailurePolicy, GateConfig, PatternRule, RuleSet};

    #[test]
    fn test_headless_sanitize_string() -> Result<()> {
        let content = "My email is test@example.com, and another is another@example.net.";
        let rules = RuleSet {
            pii_rules: vec![PatternRule {
                replace_with: Some("[EMAIL]".to_string()),
                description: Some("Matches email addresses".to_string()),
                ..PatternRule::new("email", "EMAIL", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[A-Za-z]{2,}")
            }],
            code_rules: vec![],
            denylist: vec![],
        };
        let config = PipelineConfig::new(rules, GateConfig::new(FailurePolicy::FailOpen));
        let classifier: Arc<dyn Classifier> = Arc::new(FixedClassifier::verdict("POSITIVE", 0.99));

        let sanitized = headless_sanitize_string(config, Some(classifier), content)?;

        assert_eq!(sanitized, "My email is [EMAIL], and another is [EMAIL].");
        Ok(())
    }

    #[test]
    fn test_headless_without_classifier_still_redacts() -> Result<()> {
        let config = PipelineConfig::with_default_rules(FailurePolicy::FailClosed)?;
        let sanitized = headless_sanitize_string(config, None, "ping 192.168.0.1 now")?;
        assert_eq!(sanitized, "ping [REDACTED_IP_ADDRESS] now");
        Ok(())
    }
}
