//! `promptclean rules`: show what the redaction stages will do.

use anyhow::Result;
use std::io::{self, Write};

use promptclean_core::{compile_rules, merge_rules, RuleKind, RuleSet};

use crate::cli::RulesCommand;
use crate::ui::rules_table::build_rules_table;

pub fn run_rules(cmd: &RulesCommand) -> Result<()> {
    let mut rules = RuleSet::load_default_rules()?;
    if let Some(path) = &cmd.rules {
        rules = merge_rules(rules, Some(RuleSet::load_from_file(path)?));
    }
    rules.set_active_rules(&cmd.enable, &cmd.disable);
    rules.validate()?;

    let pii = compile_rules(&rules.pii_rules, RuleKind::Pii)?;
    let code = compile_rules(&rules.code_rules, RuleKind::Code)?;
    let table = build_rules_table(&pii, &code, rules.denylist.len());

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    writeln!(writer, "{}", table)?;
    writeln!(writer, "Fingerprint: {}", rules.fingerprint()?)?;
    Ok(())
}
