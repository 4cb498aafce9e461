//! `promptclean sanitize`: run one text through the full pipeline.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use promptclean_core::{
    merge_rules, Classifier, HttpClassifier, Pipeline, PipelineConfig, RuleSet, SanitizeReport,
};

use crate::cli::SanitizeCommand;
use crate::ui::{output_format, redaction_summary};

/// Argument combinations that cannot produce a pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("--on-classifier-error is required unless --config sets gate.failure_policy")]
    MissingFailurePolicy,

    #[error(
        "no classifier endpoint configured; pass --classifier-url, set PROMPTCLEAN_CLASSIFIER_URL, \
         or run with --skip-classifier"
    )]
    MissingClassifier,
}

/// Resolves the pipeline configuration from `--config`, `--rules` and the
/// individual override flags. Flags win over the config file.
pub fn build_config(cmd: &SanitizeCommand) -> Result<PipelineConfig> {
    let mut config = match &cmd.config {
        Some(path) => {
            let mut config = PipelineConfig::load_from_file(path)?;
            if let Some(policy) = cmd.on_classifier_error {
                config.gate.failure_policy = policy.into();
            }
            config
        }
        None => {
            let policy = cmd.on_classifier_error.ok_or(UsageError::MissingFailurePolicy)?;
            PipelineConfig::with_default_rules(policy.into())?
        }
    };

    if let Some(path) = &cmd.rules {
        let user_rules = RuleSet::load_from_file(path)?;
        config.rules = merge_rules(config.rules, Some(user_rules));
    }
    config.rules.set_active_rules(&cmd.enable, &cmd.disable);

    if let Some(threshold) = cmd.threshold {
        config.gate.threshold = threshold;
    }
    if let Some(label) = &cmd.sensitive_label {
        config.gate.sensitive_label = label.clone();
    }
    if let Some(max_length) = cmd.max_length {
        config.normalizer.max_length = max_length;
    }
    if let Some(url) = &cmd.classifier_url {
        config.gate.endpoint = Some(url.clone());
    }
    if let Some(ms) = cmd.classifier_timeout_ms {
        config.gate.timeout_ms = Some(ms);
    }
    Ok(config)
}

/// Chooses the classifier and builds the pipeline.
pub fn build_pipeline(cmd: &SanitizeCommand, config: PipelineConfig) -> Result<Pipeline> {
    let builder = Pipeline::builder(config.clone());
    let builder = if cmd.skip_classifier {
        builder.skip_classifier()
    } else {
        let endpoint = config.gate.endpoint.as_deref().ok_or(UsageError::MissingClassifier)?;
        let timeout = config.gate.timeout_ms.map(Duration::from_millis);
        let mut classifier = HttpClassifier::new(endpoint, timeout)?;
        if let Some(token) = &cmd.classifier_token {
            classifier = classifier.with_token(token.clone());
        }
        info!("Using classifier endpoint {}", classifier.endpoint());
        let classifier: Arc<dyn Classifier> = Arc::new(classifier);
        builder.classifier(classifier)
    };
    builder.build().context("Failed to build sanitization pipeline")
}

fn read_input(cmd: &SanitizeCommand) -> Result<String> {
    match &cmd.input_file {
        Some(path) => {
            info!("Reading input from file: {}", path.display());
            fs::read_to_string(path).with_context(|| format!("Failed to read input file {}", path.display()))
        }
        None => {
            debug!("Reading input from stdin.");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

fn render(report: &SanitizeReport, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(report).context("Failed to serialize sanitize report")
    } else {
        Ok(report.output.clone())
    }
}

/// The main operation runner for `promptclean sanitize`.
pub fn run_sanitize(cmd: &SanitizeCommand, quiet: bool) -> Result<()> {
    let config = build_config(cmd)?;
    let pipeline = build_pipeline(cmd, config)?;
    let input = read_input(cmd)?;

    let report = pipeline.sanitize_with_report(&input);
    debug!(
        "Sanitized {} chars into {} chars ({} redactions).",
        input.chars().count(),
        report.output.chars().count(),
        report.total_redactions()
    );

    let rendered = render(&report, cmd.json)?;
    match &cmd.output {
        Some(path) => {
            let mut file = fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            writeln!(file, "{}", rendered)?;
            if !quiet {
                let stderr = io::stderr();
                let supports_color = stderr.is_terminal();
                output_format::print_info_message(
                    &mut stderr.lock(),
                    &format!("Wrote sanitized output to {}", path.display()),
                    supports_color,
                )?;
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writeln!(writer, "{}", rendered)?;
        }
    }

    if !cmd.no_summary && !quiet {
        let stderr = io::stderr();
        let supports_color = stderr.is_terminal();
        redaction_summary::print_summary(&report, &mut stderr.lock(), supports_color)?;
    }
    Ok(())
}
