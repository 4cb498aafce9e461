// promptclean/src/ui/redaction_summary.rs
//! Human-readable summary of one sanitize call, written to stderr.

use owo_colors::OwoColorize;
use std::io::{self, Write};

use promptclean_core::{FailurePolicy, GateOutcome, SanitizeReport};

/// One line for the gate decision.
pub fn describe_gate(outcome: &GateOutcome) -> String {
    match outcome {
        GateOutcome::NotRun => "not run".to_string(),
        GateOutcome::Skipped => "skipped (no classifier)".to_string(),
        GateOutcome::Passed { label, score } => format!("passed ({} {:.3})", label, score),
        GateOutcome::Flagged { label, score } => {
            format!("flagged ({} {:.3}); text replaced", label, score)
        }
        GateOutcome::Fallback { policy, error } => match policy {
            FailurePolicy::FailOpen => format!("classifier failed, forwarded ({}): {}", policy, error),
            FailurePolicy::FailClosed => format!("classifier failed, text replaced ({}): {}", policy, error),
        },
    }
}

pub fn print_summary<W: Write>(report: &SanitizeReport, writer: &mut W, supports_color: bool) -> io::Result<()> {
    let header = "Redaction Summary:";
    if supports_color {
        writeln!(writer, "\n{}", header.bold())?;
    } else {
        writeln!(writer, "\n{}", header)?;
    }

    if report.redactions.is_empty() {
        writeln!(writer, "  No redactions applied.")?;
    }
    for item in &report.redactions {
        let noun = if item.occurrences == 1 { "occurrence" } else { "occurrences" };
        if supports_color {
            writeln!(
                writer,
                "  {} ({}) -> {}: {} {}",
                item.rule_name.cyan(),
                item.stage,
                item.token,
                item.occurrences.yellow(),
                noun
            )?;
        } else {
            writeln!(
                writer,
                "  {} ({}) -> {}: {} {}",
                item.rule_name, item.stage, item.token, item.occurrences, noun
            )?;
        }
    }

    writeln!(writer, "  Gate: {}", describe_gate(&report.gate))?;
    if report.truncated {
        writeln!(writer, "  Output truncated to the maximum length.")?;
    }
    writeln!(writer, "  Rules: {}", &report.rules_fingerprint[..report.rules_fingerprint.len().min(12)])?;
    Ok(())
}
