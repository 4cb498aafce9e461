// promptclean-core/src/stages/profanity.rs
//! Whole-word, case-insensitive masking of denylisted terms.

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::config::PROFANITY_MASK;
use crate::errors::PromptCleanError;
use crate::report::SanitizeReport;
use crate::stage::Stage;

/// Replaces every whole-word occurrence of a denylist term with `***`.
///
/// All terms go into one alternation, so the pass is a single scan and the
/// mask itself is never rescanned. Runs after truncation: a word cut in half
/// by the length limit is judged on what is actually visible.
#[derive(Debug)]
pub struct ProfanityRedactor {
    matcher: Option<Regex>,
}

impl ProfanityRedactor {
    pub fn new(denylist: &[String]) -> Result<Self, PromptCleanError> {
        let mut terms: Vec<&str> = denylist
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            debug!("Denylist is empty; profanity stage is a no-op.");
            return Ok(Self { matcher: None });
        }
        // Longest first so "bad word" wins over "bad" inside the alternation.
        terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        let alternation = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
        let matcher = RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
            .case_insensitive(true)
            .build()
            .map_err(|e| PromptCleanError::RuleCompilationError("denylist".to_string(), e))?;
        debug!("Compiled denylist with {} term(s).", terms.len());
        Ok(Self { matcher: Some(matcher) })
    }

    /// Fails if a denylist term would match inside a redaction token.
    pub fn check_fixed_points(&self, protected: &[String]) -> Result<(), PromptCleanError> {
        let Some(matcher) = &self.matcher else {
            return Ok(());
        };
        match protected.iter().find(|t| matcher.is_match(t)) {
            Some(token) => Err(PromptCleanError::InvalidConfig(format!(
                "a denylist term matches the redaction token '{}'",
                token
            ))),
            None => Ok(()),
        }
    }
}

impl Stage for ProfanityRedactor {
    fn name(&self) -> &'static str {
        "profanity"
    }

    fn apply(&self, text: String, report: &mut SanitizeReport) -> String {
        let Some(matcher) = &self.matcher else {
            return text;
        };
        let occurrences = matcher.find_iter(&text).count();
        if occurrences == 0 {
            return text;
        }
        report.record("profanity", "denylist", PROFANITY_MASK, occurrences);
        matcher.replace_all(&text, PROFANITY_MASK).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(denylist: &[&str], input: &str) -> String {
        let terms: Vec<String> = denylist.iter().map(|t| t.to_string()).collect();
        let stage = ProfanityRedactor::new(&terms).unwrap();
        stage.apply(input.to_string(), &mut SanitizeReport::new(""))
    }

    #[test]
    fn test_whole_word_case_insensitive() {
        assert_eq!(mask(&["badword1"], "a BadWord1 b badword1."), "a *** b ***.");
    }

    #[test]
    fn test_substring_is_not_masked() {
        assert_eq!(mask(&["ass"], "classwork is due, ass"), "classwork is due, ***");
    }

    #[test]
    fn test_terms_are_literal() {
        assert_eq!(mask(&["a.b"], "axb a.b"), "axb ***");
    }

    #[test]
    fn test_multi_word_term_beats_its_prefix() {
        assert_eq!(mask(&["darn", "darn it"], "oh darn it"), "oh ***");
    }

    #[test]
    fn test_empty_denylist_is_noop() {
        assert_eq!(mask(&[], "anything"), "anything");
    }

    #[test]
    fn test_term_matching_token_is_rejected() {
        let stage = ProfanityRedactor::new(&["redacted_code".to_string()]).unwrap();
        assert!(stage.check_fixed_points(&["[REDACTED_CODE]".to_string()]).is_err());
    }
}
