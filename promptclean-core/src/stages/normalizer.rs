// promptclean-core/src/stages/normalizer.rs
//! Whitespace, character-set and length normalization.

use log::debug;
use std::collections::HashSet;
use strip_ansi_escapes::strip;

use crate::config::NormalizerConfig;
use crate::report::SanitizeReport;
use crate::stage::Stage;

/// Cleans the text and bounds its length.
///
/// Steps, in order:
/// 1. turn every whitespace character (tabs, newlines, NBSP, ...) into a space;
/// 2. strip ANSI escape sequences (when enabled);
/// 3. drop characters outside the printable set;
/// 4. collapse space runs to one space and trim;
/// 5. hard-cut at `max_length` characters, then trim the trailing space the
///    cut may have exposed.
///
/// Filtering runs before collapsing so a dropped character never leaves two
/// adjacent spaces behind, and both run before the cut so the limit is
/// measured on cleaned text.
#[derive(Debug, Clone)]
pub struct Normalizer {
    max_length: usize,
    printable: HashSet<char>,
    strip_ansi: bool,
}

impl Normalizer {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            max_length: config.max_length,
            printable: config.printable_set().into_iter().collect(),
            strip_ansi: config.strip_ansi,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Steps 1-4 without the length cut. `clean(clean(x)) == clean(x)`.
    ///
    /// The pipeline runs this on the raw input before any rule sees it, so
    /// a literal split by a tab, a doubled space or a dropped control
    /// character is already whole when the PII and code rules match.
    pub fn clean(&self, text: &str) -> String {
        let spaced: String = text
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();
        let text = if self.strip_ansi {
            String::from_utf8_lossy(&strip(spaced.as_bytes())).into_owned()
        } else {
            spaced
        };

        let printable: String = text.chars().filter(|c| self.printable.contains(c)).collect();
        printable.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Cuts `text` to `max_length` chars. Returns true if anything was removed.
    pub(crate) fn truncate(&self, text: &mut String) -> bool {
        let Some((cut, _)) = text.char_indices().nth(self.max_length) else {
            return false;
        };
        text.truncate(cut);
        let trimmed = text.trim_end().len();
        text.truncate(trimmed);
        true
    }
}

impl Stage for Normalizer {
    fn name(&self) -> &'static str {
        "normalizer"
    }

    fn apply(&self, text: String, report: &mut SanitizeReport) -> String {
        let mut collapsed = self.clean(&text);
        if self.truncate(&mut collapsed) {
            debug!("Normalizer truncated text to {} characters.", self.max_length);
            report.truncated = true;
        }
        collapsed
    }
}
