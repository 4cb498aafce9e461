// promptclean-core/src/lib.rs
//! # promptclean Core Library
//!
//! `promptclean-core` turns free-form text (typically a prompt on its way to
//! an external text-generation service) into a cleaned, bounded-length string
//! that is safe to forward. It does so with five ordered stages:
//!
//! 1. **PII redaction** - email, phone, government ID, payment card, IP address.
//! 2. **Code redaction** - script blocks, template delimiters, process execution.
//! 3. **Sensitivity gate** - a pluggable classifier may flag the whole text.
//! 4. **Normalization** - whitespace, printable characters, maximum length.
//! 5. **Profanity masking** - whole-word denylist terms.
//!
//! The character cleaning of stage 4 also runs once on the raw input, before
//! stage 1, so the rules never miss a literal that cleaning would rebuild.
//!
//! ## Modules
//!
//! * `config`: `PatternRule`, `RuleSet` and the per-stage settings in `PipelineConfig`.
//! * `sanitizers`: rule compilation shared by the two redaction stages.
//! * `validators`: optional checksum/structure checks for PII candidates.
//! * `classifier`: the `Classifier` capability consumed by the gate.
//! * `classifiers`: HTTP, timeout and fixed-verdict classifiers.
//! * `stage` / `stages`: the `Stage` trait and the five implementations.
//! * `pipeline`: `Pipeline` and `PipelineBuilder`.
//! * `report`: `SanitizeReport` and PII-safe logging helpers.
//! * `headless`: one-shot convenience wrapper.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use promptclean_core::{FailurePolicy, FixedClassifier, Pipeline, PipelineConfig};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let config = PipelineConfig::with_default_rules(FailurePolicy::FailOpen)?;
//!     let classifier = Arc::new(FixedClassifier::verdict("POSITIVE", 0.98));
//!     let pipeline = Pipeline::new(config, classifier)?;
//!
//!     let cleaned = pipeline.sanitize("Mail john.doe@example.com, then exec('x')");
//!     assert_eq!(cleaned, "Mail [REDACTED_EMAIL], then [REDACTED_CODE]'x')");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Everything that can be wrong with a pipeline is caught when it is built
//! and reported as [`PromptCleanError`]. Once built, `sanitize` cannot fail:
//! classifier outages resolve through the configured [`FailurePolicy`].
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod classifier;
pub mod classifiers;
pub mod config;
pub mod errors;
pub mod headless;
pub mod pipeline;
pub mod report;
pub mod sanitizers;
pub mod stage;
pub mod stages;
pub mod validators;

/// Re-exports the configuration types and functions for managing rule tables.
pub use config::{
    merge_rules,
    FailurePolicy,
    GateConfig,
    NormalizerConfig,
    PatternRule,
    PipelineConfig,
    RuleKind,
    RuleSet,
    CODE_TOKEN,
    DEFAULT_MAX_LENGTH,
    MAX_PATTERN_LENGTH,
    PROFANITY_MASK,
    SENSITIVE_SENTINEL,
};

pub use errors::{ClassifierError, PromptCleanError};

pub use classifier::{ClassificationVerdict, Classifier};
pub use classifiers::{FixedClassifier, HttpClassifier, TimeoutClassifier};

pub use pipeline::{Pipeline, PipelineBuilder};
pub use stage::Stage;

pub use report::{redact_sensitive, GateOutcome, RedactionSummaryItem, SanitizeReport};

pub use headless::headless_sanitize_string;

pub use sanitizers::compiler::{compile_rules, CompiledRule, CompiledRules};
