//! errors.rs - Custom error types for the promptclean-core library.
//!
//! Construction-time failures are reported through [`PromptCleanError`].
//! Classifier failures have their own type, [`ClassifierError`], because they
//! are always recovered inside the gate and never escape `sanitize`.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// All errors that can stop a pipeline from being built.
///
/// Marked `#[non_exhaustive]` so new variants can be added without breaking
/// downstream matches.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PromptCleanError {
    #[error("Failed to compile redaction rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to serialize configuration for hashing: {0}")]
    SerializationError(String),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

/// Failure modes of a [`Classifier`](crate::classifier::Classifier).
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier did not answer within {0} ms")]
    Timeout(u64),

    #[error("classifier returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("classifier returned an out-of-range score {score} for label '{label}'")]
    InvalidVerdict { label: String, score: f64 },
}
