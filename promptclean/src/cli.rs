// promptclean/src/cli.rs
//! This file defines the command-line interface (CLI) for the promptclean
//! application, including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use promptclean_core::FailurePolicy;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "promptclean",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Sanitize prompts before they leave for a text-generation service",
    long_about = "promptclean runs text through five fixed stages: PII redaction, code/injection redaction, a sensitivity classifier gate, normalization, and profanity masking. The result is a bounded-length string that is safe to forward.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `promptclean` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitizes an input file or stdin.
    #[command(about = "Sanitizes an input file or stdin through the full pipeline.")]
    Sanitize(SanitizeCommand),

    /// Lists the active redaction rules and the rule-set fingerprint.
    #[command(about = "Lists the active redaction rules and the rule-set fingerprint.")]
    Rules(RulesCommand),
}

/// What to do when the classifier cannot answer.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OnClassifierError {
    /// Forward the text (after the other stages).
    FailOpen,
    /// Replace the text with the sensitive-content sentinel.
    FailClosed,
}

impl From<OnClassifierError> for FailurePolicy {
    fn from(value: OnClassifierError) -> Self {
        match value {
            OnClassifierError::FailOpen => FailurePolicy::FailOpen,
            OnClassifierError::FailClosed => FailurePolicy::FailClosed,
        }
    }
}

/// Arguments for the `sanitize` command.
#[derive(Parser, Debug, Default)]
pub struct SanitizeCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Write sanitized output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Full pipeline configuration (rules, gate, normalizer).
    #[arg(long = "config", value_name = "FILE", help = "Path to a pipeline configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Extra rules merged over the default rule set.
    #[arg(long = "rules", value_name = "FILE", help = "Path to a rules file (YAML) merged over the defaults.")]
    pub rules: Option<PathBuf>,

    #[arg(
        long = "classifier-url",
        value_name = "URL",
        env = "PROMPTCLEAN_CLASSIFIER_URL",
        help = "Inference endpoint for the sensitivity classifier."
    )]
    pub classifier_url: Option<String>,

    #[arg(
        long = "classifier-token",
        value_name = "TOKEN",
        env = "PROMPTCLEAN_CLASSIFIER_TOKEN",
        hide_env_values = true,
        help = "Bearer token sent to the classifier endpoint."
    )]
    pub classifier_token: Option<String>,

    #[arg(long = "classifier-timeout-ms", value_name = "MS", help = "Classifier request timeout in milliseconds.")]
    pub classifier_timeout_ms: Option<u64>,

    /// Required unless a config file sets `gate.failure_policy`.
    #[arg(
        long = "on-classifier-error",
        value_enum,
        value_name = "POLICY",
        help = "What to do when the classifier fails (required without --config)."
    )]
    pub on_classifier_error: Option<OnClassifierError>,

    #[arg(long, value_name = "F", help = "Flag text when the sensitive label scores strictly above this.")]
    pub threshold: Option<f64>,

    #[arg(long = "sensitive-label", value_name = "LABEL", help = "Classifier label that marks text as sensitive.")]
    pub sensitive_label: Option<String>,

    #[arg(long = "max-length", value_name = "N", help = "Maximum output length in characters.")]
    pub max_length: Option<usize>,

    /// Bypass the classifier gate. The other four stages still run.
    #[arg(long = "skip-classifier", help = "Run without a classifier; the gate is skipped.")]
    pub skip_classifier: bool,

    /// Enable opt-in rule names (comma-separated).
    #[arg(long, short = 'e', value_delimiter = ',', help = "Enable these opt-in rule names (comma-separated).")]
    pub enable: Vec<String>,

    /// Explicitly disable these rule names (comma-separated).
    #[arg(long, short = 'x', value_delimiter = ',', help = "Explicitly disable these rule names (comma-separated).")]
    pub disable: Vec<String>,

    /// Print the full report as JSON instead of the sanitized text.
    #[arg(long, help = "Print the sanitize report as JSON instead of plain text.")]
    pub json: bool,

    /// Suppress the redaction summary.
    #[arg(long = "no-redaction-summary", help = "Suppress the redaction summary.")]
    pub no_summary: bool,
}

/// Arguments for the `rules` command.
#[derive(Parser, Debug, Default)]
pub struct RulesCommand {
    /// Extra rules merged over the default rule set.
    #[arg(long = "rules", value_name = "FILE", help = "Path to a rules file (YAML) merged over the defaults.")]
    pub rules: Option<PathBuf>,

    #[arg(long, short = 'e', value_delimiter = ',', help = "Enable these opt-in rule names (comma-separated).")]
    pub enable: Vec<String>,

    #[arg(long, short = 'x', value_delimiter = ',', help = "Explicitly disable these rule names (comma-separated).")]
    pub disable: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_policy_and_rule_lists() {
        let cli = Cli::try_parse_from([
            "promptclean",
            "sanitize",
            "--on-classifier-error",
            "fail-closed",
            "--disable",
            "phone,ipv4_address",
            "--skip-classifier",
        ])
        .unwrap();
        let Commands::Sanitize(cmd) = cli.command else {
            panic!("expected sanitize");
        };
        assert_eq!(cmd.on_classifier_error, Some(OnClassifierError::FailClosed));
        assert_eq!(cmd.disable, vec!["phone", "ipv4_address"]);
        assert!(cmd.skip_classifier);
        assert_eq!(FailurePolicy::from(OnClassifierError::FailClosed), FailurePolicy::FailClosed);
    }
}
