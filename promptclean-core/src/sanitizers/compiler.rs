//! compiler.rs - Compiles `PatternRule`s into ready-to-apply regexes.
//!
//! Each pipeline compiles its own rules at construction. There is no shared
//! cache: two pipelines never observe each other's rule tables.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

use crate::config::{PatternRule, RuleKind, MAX_PATTERN_LENGTH};
use crate::errors::PromptCleanError;
use crate::report::{log_captured_match_debug, log_redaction_action_debug, SanitizeReport};
use crate::validators;

/// Bracketed, uppercase, category-tagged.
static TOKEN_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[[A-Z0-9_]+\]$").unwrap());

/// Size limit for a single compiled regex.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// A single compiled redaction rule.
#[derive(Debug)]
pub struct CompiledRule {
    /// The compiled regular expression used for matching.
    pub regex: Regex,
    /// The token written in place of each accepted match.
    pub replace_with: String,
    /// The unique name of the redaction rule.
    pub name: String,
    pub category: String,
    /// A flag indicating if this rule requires additional programmatic validation.
    pub programmatic_validation: bool,
}

impl CompiledRule {
    fn accepts(&self, candidate: &str) -> bool {
        !self.programmatic_validation || validators::validate_for_category(&self.category, candidate)
    }
}

/// All compiled rules for one redaction stage, in application order.
#[derive(Debug)]
pub struct CompiledRules {
    pub kind: RuleKind,
    pub rules: Vec<CompiledRule>,
}

impl CompiledRules {
    /// Applies every rule once, in order, each over the text left by the
    /// previous rule. Counts go into `report`.
    pub fn apply(&self, mut text: String, report: &mut SanitizeReport) -> String {
        let stage = self.kind.to_string();
        for rule in &self.rules {
            let mut occurrences = 0usize;
            let replaced = rule.regex.replace_all(&text, |caps: &Captures<'_>| {
                let matched = &caps[0];
                log_captured_match_debug("[promptclean_core::compiler]", &rule.name, matched);
                if rule.accepts(matched) {
                    log_redaction_action_debug("[promptclean_core::compiler]", matched, &rule.replace_with, &rule.name);
                    occurrences += 1;
                    rule.replace_with.clone()
                } else {
                    debug!("Rule '{}' rejected a candidate during validation.", rule.name);
                    matched.to_string()
                }
            });
            if occurrences > 0 {
                text = replaced.into_owned();
                report.record(&stage, &rule.name, &rule.replace_with, occurrences);
            }
        }
        text
    }

    /// Fails if any rule matches one of `protected`.
    ///
    /// Tokens that no rule can match keep redacted output stable under a
    /// second pass.
    pub fn check_fixed_points(&self, protected: &[String]) -> Result<(), PromptCleanError> {
        for rule in &self.rules {
            if let Some(token) = protected.iter().find(|t| rule.regex.is_match(t)) {
                return Err(PromptCleanError::InvalidConfig(format!(
                    "{} rule '{}' matches the redaction token '{}'",
                    self.kind, rule.name, token
                )));
            }
        }
        Ok(())
    }

    /// Tokens this rule set writes.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        for rule in &self.rules {
            if !tokens.contains(&rule.replace_with) {
                tokens.push(rule.replace_with.clone());
            }
        }
        tokens
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Compiles the enabled rules of one stage.
///
/// Every failing rule is reported in a single error so a bad rule file can be
/// fixed in one pass.
pub fn compile_rules(rules: &[PatternRule], kind: RuleKind) -> Result<CompiledRules, PromptCleanError> {
    debug!("Starting compilation of {} {} rules.", rules.len(), kind);

    let mut compiled_rules = Vec::new();
    let mut compilation_errors = Vec::new();

    for rule in rules {
        if !rule.is_enabled() {
            debug!("Skipping disabled rule '{}'.", rule.name);
            continue;
        }

        if rule.pattern.len() > MAX_PATTERN_LENGTH {
            compilation_errors.push(PromptCleanError::PatternLengthExceeded(
                rule.name.clone(),
                rule.pattern.len(),
                MAX_PATTERN_LENGTH,
            ));
            continue;
        }

        let token = rule.token(kind);
        if !TOKEN_SHAPE.is_match(&token) {
            compilation_errors.push(PromptCleanError::InvalidConfig(format!(
                "rule '{}' token '{}' must look like [UPPER_CASE]",
                rule.name, token
            )));
            continue;
        }

        let regex_result = RegexBuilder::new(&rule.pattern)
            .case_insensitive(rule.is_case_insensitive(kind))
            .dot_matches_new_line(rule.dot_matches_new_line_for(kind))
            .size_limit(REGEX_SIZE_LIMIT)
            .build();

        match regex_result {
            Ok(regex) => {
                debug!(
                    target: "promptclean_core::sanitizer",
                    "Rule '{}' compiled successfully.",
                    &rule.name
                );
                compiled_rules.push(CompiledRule {
                    regex,
                    replace_with: token,
                    name: rule.name.clone(),
                    category: rule.category.clone(),
                    programmatic_validation: rule.programmatic_validation,
                });
            }
            Err(e) => {
                compilation_errors.push(PromptCleanError::RuleCompilationError(rule.name.clone(), e));
            }
        }
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        return Err(PromptCleanError::Fatal(format!(
            "Failed to compile {} rule(s):\n{}",
            compilation_errors.len(),
            error_message
        )));
    }

    debug!("Finished compiling {} rules. Total compiled: {}.", kind, compiled_rules.len());
    Ok(CompiledRules {
        kind,
        rules: compiled_rules,
    })
}
