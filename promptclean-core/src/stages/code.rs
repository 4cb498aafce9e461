// promptclean-core/src/stages/code.rs
//! Redaction of embedded script, template and process-execution fragments.

use log::debug;

use crate::config::{PatternRule, RuleKind};
use crate::errors::PromptCleanError;
use crate::report::SanitizeReport;
use crate::sanitizers::compiler::{compile_rules, CompiledRules};
use crate::stage::Stage;

/// Replaces every code-rule match with `[REDACTED_CODE]`.
///
/// Rules compile case-insensitive with `.` matching newlines unless a rule
/// says otherwise, so a multi-line `<script>` block is one span. Each rule
/// scans the text as the previous rule left it.
#[derive(Debug)]
pub struct CodeRedactor {
    rules: CompiledRules,
}

impl CodeRedactor {
    pub fn new(rules: &[PatternRule]) -> Result<Self, PromptCleanError> {
        Ok(Self {
            rules: compile_rules(rules, RuleKind::Code)?,
        })
    }

    pub fn compiled_rules(&self) -> &CompiledRules {
        &self.rules
    }
}

impl Stage for CodeRedactor {
    fn name(&self) -> &'static str {
        "code"
    }

    fn apply(&self, text: String, report: &mut SanitizeReport) -> String {
        let before = report.total_redactions();
        let text = self.rules.apply(text, report);
        debug!("Code stage redacted {} span(s).", report.total_redactions() - before);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSet;

    fn redact(input: &str) -> String {
        let rules = RuleSet::load_default_rules().unwrap();
        let stage = CodeRedactor::new(&rules.code_rules).unwrap();
        stage.apply(input.to_string(), &mut SanitizeReport::new(""))
    }

    #[test]
    fn test_multiline_script_is_one_span() {
        let input = "before <SCRIPT type=\"text/javascript\">\nalert(1);\nfetch('/x');\n</script> after";
        assert_eq!(redact(input), "before [REDACTED_CODE] after");
    }

    #[test]
    fn test_template_delimiters() {
        assert_eq!(redact("a <?php echo 1; ?> b <% x %> c"), "a [REDACTED_CODE] b [REDACTED_CODE] c");
    }

    #[test]
    fn test_process_execution_calls() {
        assert_eq!(redact("Run this: exec('ls')"), "Run this: [REDACTED_CODE]'ls')");
        assert_eq!(redact("OS.SYSTEM ('id')"), "[REDACTED_CODE]'id')");
        assert_eq!(redact("subprocess.run(x)"), "[REDACTED_CODE]run(x)");
        assert_eq!(redact("x = eval (y)"), "x = [REDACTED_CODE]y)");
    }

    #[test]
    fn test_imports() {
        assert_eq!(redact("import os\nimport   subprocess"), "[REDACTED_CODE]\n[REDACTED_CODE]");
    }

    #[test]
    fn test_every_rule_uses_the_code_token() {
        let rules = RuleSet::load_default_rules().unwrap();
        let stage = CodeRedactor::new(&rules.code_rules).unwrap();
        assert_eq!(stage.compiled_rules().tokens(), vec!["[REDACTED_CODE]".to_string()]);
    }
}
