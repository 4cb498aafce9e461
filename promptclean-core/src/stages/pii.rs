// promptclean-core/src/stages/pii.rs
//! Pattern-based redaction of structured PII.

use log::debug;

use crate::config::{PatternRule, RuleKind};
use crate::errors::PromptCleanError;
use crate::report::SanitizeReport;
use crate::sanitizers::compiler::{compile_rules, CompiledRules};
use crate::stage::Stage;

/// Replaces each PII rule's matches with `[REDACTED_<CATEGORY>]`.
///
/// Rules run in configured order. A later rule only sees the tokens an
/// earlier rule wrote, so overlapping candidates go to the earlier rule.
#[derive(Debug)]
pub struct PiiRedactor {
    rules: CompiledRules,
}

impl PiiRedactor {
    pub fn new(rules: &[PatternRule]) -> Result<Self, PromptCleanError> {
        Ok(Self {
            rules: compile_rules(rules, RuleKind::Pii)?,
        })
    }

    pub fn compiled_rules(&self) -> &CompiledRules {
        &self.rules
    }
}

impl Stage for PiiRedactor {
    fn name(&self) -> &'static str {
        "pii"
    }

    fn apply(&self, text: String, report: &mut SanitizeReport) -> String {
        let before = report.total_redactions();
        let text = self.rules.apply(text, report);
        debug!("PII stage redacted {} span(s).", report.total_redactions() - before);
        text
    }
}
