//! Configuration management for `promptclean-core`.
//!
//! This module defines the rule tables (`PatternRule`, `RuleSet`) and the
//! per-stage settings that make up a `PipelineConfig`. Rule tables are plain
//! data: they are loaded from YAML once, validated, and then treated as
//! read-only for the lifetime of the pipeline built from them.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

use crate::errors::PromptCleanError;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Token used for every code/injection match, regardless of rule.
pub const CODE_TOKEN: &str = "[REDACTED_CODE]";

/// Replaces the whole text when the classifier flags it.
pub const SENSITIVE_SENTINEL: &str = "[FLAGGED_SENSITIVE_CONTENT]";

/// Replaces every denylisted word.
pub const PROFANITY_MASK: &str = "***";

pub const DEFAULT_MAX_LENGTH: usize = 1000;
pub const DEFAULT_SENSITIVITY_THRESHOLD: f64 = 0.9;
pub const DEFAULT_SENSITIVE_LABEL: &str = "NEGATIVE";

/// ASCII digits, letters, punctuation and whitespace.
pub const DEFAULT_PRINTABLE_CHARSET: &str = concat!(
    "0123456789",
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
    " \t\n\r\x0b\x0c",
);

/// Which redaction stage a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Pii,
    Code,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pii => write!(f, "pii"),
            Self::Code => write!(f, "code"),
        }
    }
}

/// A single named pattern paired with its replacement token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternRule {
    /// Unique identifier within its rule list (e.g., "email").
    pub name: String,
    /// Category tag (e.g., "EMAIL"). PII tokens are built from it.
    pub category: String,
    /// Human-readable description of what the rule targets.
    pub description: Option<String>,
    /// The regex pattern string.
    pub pattern: String,
    /// Explicit token for PII rules. Defaults to `[REDACTED_<CATEGORY>]`.
    pub replace_with: Option<String>,
    /// Defaults to `false` for PII rules and `true` for code rules.
    pub case_insensitive: Option<bool>,
    /// Defaults to `false` for PII rules and `true` for code rules.
    pub dot_matches_new_line: Option<bool>,
    /// If true, a match is only redacted when the category validator accepts it.
    pub programmatic_validation: bool,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
    /// If true, the rule is dropped unless explicitly enabled.
    pub opt_in: bool,
    /// Metadata tags for categorization.
    pub tags: Option<Vec<String>>,
}

impl Default for PatternRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: String::new(),
            description: None,
            pattern: String::new(),
            replace_with: None,
            case_insensitive: None,
            dot_matches_new_line: None,
            programmatic_validation: false,
            enabled: None,
            opt_in: false,
            tags: None,
        }
    }
}

impl PatternRule {
    /// Convenience constructor used by tests and programmatic callers.
    pub fn new(name: &str, category: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            pattern: pattern.to_string(),
            ..Self::default()
        }
    }

    /// The token this rule writes in place of each match.
    pub fn token(&self, kind: RuleKind) -> String {
        match kind {
            RuleKind::Code => CODE_TOKEN.to_string(),
            RuleKind::Pii => self
                .replace_with
                .clone()
                .unwrap_or_else(|| format!("[REDACTED_{}]", self.category.to_uppercase())),
        }
    }

    pub fn is_case_insensitive(&self, kind: RuleKind) -> bool {
        self.case_insensitive.unwrap_or(kind == RuleKind::Code)
    }

    pub fn dot_matches_new_line_for(&self, kind: RuleKind) -> bool {
        self.dot_matches_new_line.unwrap_or(kind == RuleKind::Code)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }
}

/// The complete set of redaction tables: PII rules, code rules and the denylist.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleSet {
    /// Applied in list order; earlier rules win overlaps.
    pub pii_rules: Vec<PatternRule>,
    pub code_rules: Vec<PatternRule>,
    /// Terms masked as whole words, case-insensitively.
    pub denylist: Vec<String>,
}

impl RuleSet {
    /// Loads a rule set from a YAML file and validates it.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        let rules: RuleSet = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse rules file {}", path.display()))?;

        rules.validate()?;
        info!(
            "Loaded {} PII rules, {} code rules and {} denylist terms from {}.",
            rules.pii_rules.len(),
            rules.code_rules.len(),
            rules.denylist.len(),
            path.display()
        );
        Ok(rules)
    }

    /// Loads the built-in rule set embedded at compile time.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default rules from embedded string...");
        let default_yaml = include_str!("../config/default_rules.yaml");
        let rules: RuleSet =
            serde_yml::from_str(default_yaml).context("Failed to parse default rules")?;

        debug!(
            "Loaded {} default PII rules and {} default code rules.",
            rules.pii_rules.len(),
            rules.code_rules.len()
        );
        Ok(rules)
    }

    /// Drops disabled rules and opt-in rules that were not explicitly enabled.
    pub fn set_active_rules(&mut self, enable_rules: &[String], disable_rules: &[String]) {
        let enable_set: HashSet<&str> = enable_rules.iter().map(String::as_str).collect();
        let disable_set: HashSet<&str> = disable_rules.iter().map(String::as_str).collect();

        let all_rule_names: HashSet<&str> = self
            .pii_rules
            .iter()
            .chain(self.code_rules.iter())
            .map(|r| r.name.as_str())
            .collect();

        for rule_name in enable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `enable_rules` list does not exist.", rule_name);
        }
        for rule_name in disable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `disable_rules` list does not exist.", rule_name);
        }

        let keep = |rule: &PatternRule| {
            let name = rule.name.as_str();
            !disable_set.contains(name) && (!rule.opt_in || enable_set.contains(name))
        };
        self.pii_rules.retain(keep);
        self.code_rules.retain(keep);

        debug!(
            "Active rules after filtering: {} PII, {} code.",
            self.pii_rules.len(),
            self.code_rules.len()
        );
    }

    /// Checks names, patterns and denylist terms. All problems are reported at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        validate_rules(&self.pii_rules, RuleKind::Pii, &mut errors);
        validate_rules(&self.code_rules, RuleKind::Code, &mut errors);

        let mut seen = HashSet::new();
        for term in self.denylist.iter().map(|t| t.trim()) {
            if term.is_empty() {
                errors.push("The denylist contains an empty term.".to_string());
            } else if term.chars().count() < PROFANITY_MASK.chars().count() {
                errors.push(format!(
                    "Denylist term '{}' is shorter than the mask '{}'.",
                    term, PROFANITY_MASK
                ));
            } else if !seen.insert(term.to_lowercase()) {
                debug!("Denylist term '{}' is listed more than once.", term);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Rule validation failed:\n{}", errors.join("\n")))
        }
    }

    /// Hex SHA-256 over the canonical JSON form of the rule set.
    ///
    /// Two pipelines with equal fingerprints redact identically.
    pub fn fingerprint(&self) -> Result<String, PromptCleanError> {
        let canonical = serde_json::to_vec(self)
            .map_err(|e| PromptCleanError::SerializationError(e.to_string()))?;
        Ok(hex::encode(Sha256::digest(&canonical)))
    }
}

fn validate_rules(rules: &[PatternRule], kind: RuleKind, errors: &mut Vec<String>) {
    let mut rule_names = HashSet::new();
    for rule in rules {
        if rule.name.is_empty() {
            errors.push(format!("A {} rule has an empty `name` field.", kind));
        } else if !rule_names.insert(rule.name.as_str()) {
            errors.push(format!("Duplicate {} rule name found: '{}'.", kind, rule.name));
        }

        if rule.category.trim().is_empty() {
            errors.push(format!("Rule '{}' has an empty `category` field.", rule.name));
        }

        if rule.pattern.is_empty() {
            errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name));
            continue;
        }
        if rule.pattern.len() > MAX_PATTERN_LENGTH {
            errors.push(format!(
                "Rule '{}': pattern length ({}) exceeds maximum allowed ({}).",
                rule.name,
                rule.pattern.len(),
                MAX_PATTERN_LENGTH
            ));
            continue;
        }
        if let Err(e) = Regex::new(&rule.pattern) {
            errors.push(format!("Rule '{}' has an invalid regex pattern: {}", rule.name, e));
        }

        if kind == RuleKind::Code {
            if let Some(replacement) = &rule.replace_with {
                if replacement != CODE_TOKEN {
                    errors.push(format!(
                        "Code rule '{}' sets `replace_with`; code rules always redact to {}.",
                        rule.name, CODE_TOKEN
                    ));
                }
            }
        }
    }
}

/// Merges a user rule set over the defaults.
///
/// A user rule replaces the default rule of the same name in place, so the
/// default ordering is kept. New user rules are appended. Denylist terms are
/// unioned, case-insensitively.
pub fn merge_rules(default_rules: RuleSet, user_rules: Option<RuleSet>) -> RuleSet {
    let Some(user) = user_rules else {
        return default_rules;
    };
    debug!(
        "Merging {} user PII rules and {} user code rules over defaults.",
        user.pii_rules.len(),
        user.code_rules.len()
    );

    let mut merged = default_rules;
    merge_rule_list(&mut merged.pii_rules, user.pii_rules);
    merge_rule_list(&mut merged.code_rules, user.code_rules);

    let mut seen: HashSet<String> = merged.denylist.iter().map(|t| t.to_lowercase()).collect();
    for term in user.denylist {
        if seen.insert(term.to_lowercase()) {
            merged.denylist.push(term);
        }
    }
    merged
}

fn merge_rule_list(base: &mut Vec<PatternRule>, overrides: Vec<PatternRule>) {
    for rule in overrides {
        match base.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => *existing = rule,
            None => base.push(rule),
        }
    }
}

/// What the gate does when the classifier cannot produce a usable verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Pass the text through unchanged.
    FailOpen,
    /// Treat the text as sensitive and replace it with the sentinel.
    FailClosed,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailOpen => write!(f, "fail-open"),
            Self::FailClosed => write!(f, "fail-closed"),
        }
    }
}

fn default_sensitive_label() -> String {
    DEFAULT_SENSITIVE_LABEL.to_string()
}

fn default_threshold() -> f64 {
    DEFAULT_SENSITIVITY_THRESHOLD
}

/// Settings for the sensitivity classifier gate.
///
/// There is intentionally no `Default`: `failure_policy` must be chosen.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GateConfig {
    #[serde(default = "default_sensitive_label")]
    pub sensitive_label: String,
    /// Verdicts must score strictly above this to flag the text.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub failure_policy: FailurePolicy,
    /// Inference endpoint for the HTTP classifier, if one is used.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl GateConfig {
    pub fn new(failure_policy: FailurePolicy) -> Self {
        Self {
            sensitive_label: default_sensitive_label(),
            threshold: default_threshold(),
            failure_policy,
            endpoint: None,
            timeout_ms: None,
        }
    }
}

/// Settings for the whitespace/charset/length normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Maximum output length in characters.
    pub max_length: usize,
    /// Allowed characters. `None` means [`DEFAULT_PRINTABLE_CHARSET`].
    pub printable_charset: Option<String>,
    /// Remove ANSI escape sequences as whole units before charset filtering.
    pub strip_ansi: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            printable_charset: None,
            strip_ansi: true,
        }
    }
}

impl NormalizerConfig {
    pub fn printable_set(&self) -> BTreeSet<char> {
        self.printable_charset
            .as_deref()
            .unwrap_or(DEFAULT_PRINTABLE_CHARSET)
            .chars()
            .collect()
    }
}

/// Everything a pipeline needs, apart from the classifier itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub rules: RuleSet,
    pub gate: GateConfig,
    pub normalizer: NormalizerConfig,
}

/// On-disk shape of a full config file. `rules` is merged over the defaults
/// unless `replace_default_rules` is set.
#[derive(Debug, Deserialize)]
struct PipelineConfigFile {
    #[serde(default)]
    rules: Option<RuleSet>,
    #[serde(default)]
    replace_default_rules: bool,
    gate: GateConfig,
    #[serde(default)]
    normalizer: NormalizerConfig,
}

impl PipelineConfig {
    pub fn new(rules: RuleSet, gate: GateConfig) -> Self {
        Self {
            rules,
            gate,
            normalizer: NormalizerConfig::default(),
        }
    }

    /// Default rule tables with the given failure policy.
    pub fn with_default_rules(failure_policy: FailurePolicy) -> Result<Self> {
        Ok(Self::new(
            RuleSet::load_default_rules()?,
            GateConfig::new(failure_policy),
        ))
    }

    /// Loads a full pipeline config from YAML.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading pipeline config from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to load config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let file: PipelineConfigFile =
            serde_yml::from_str(text).context("Failed to parse pipeline config")?;

        let rules = match (file.rules, file.replace_default_rules) {
            (Some(user), true) => user,
            (None, true) => return Err(anyhow!("`replace_default_rules` is set but no `rules` were given")),
            (user, false) => merge_rules(RuleSet::load_default_rules()?, user),
        };
        rules.validate()?;

        Ok(Self {
            rules,
            gate: file.gate,
            normalizer: file.normalizer,
        })
    }

    /// Validates everything that can be checked without compiling rules.
    pub fn validate(&self) -> Result<(), PromptCleanError> {
        self.rules
            .validate()
            .map_err(|e| PromptCleanError::InvalidConfig(e.to_string()))?;

        if !(0.0..=1.0).contains(&self.gate.threshold) {
            return Err(PromptCleanError::InvalidConfig(format!(
                "sensitivity threshold {} is outside [0, 1]",
                self.gate.threshold
            )));
        }
        if self.gate.sensitive_label.trim().is_empty() {
            return Err(PromptCleanError::InvalidConfig(
                "sensitive label must not be empty".to_string(),
            ));
        }

        let sentinel_len = SENSITIVE_SENTINEL.chars().count();
        if self.normalizer.max_length < sentinel_len {
            return Err(PromptCleanError::InvalidConfig(format!(
                "max_length {} cannot hold the {} character sentinel",
                self.normalizer.max_length, sentinel_len
            )));
        }

        let printable = self.normalizer.printable_set();
        if !printable.contains(&' ') {
            return Err(PromptCleanError::InvalidConfig(
                "printable charset must contain the space character".to_string(),
            ));
        }
        let mut required: Vec<String> = vec![
            SENSITIVE_SENTINEL.to_string(),
            PROFANITY_MASK.to_string(),
            CODE_TOKEN.to_string(),
        ];
        required.extend(self.rules.pii_rules.iter().map(|r| r.token(RuleKind::Pii)));
        for token in &required {
            if let Some(c) = token.chars().find(|c| !printable.contains(c)) {
                return Err(PromptCleanError::InvalidConfig(format!(
                    "printable charset is missing {:?}, used by '{}'",
                    c, token
                )));
            }
        }
        Ok(())
    }
}
