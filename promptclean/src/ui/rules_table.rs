// promptclean/src/ui/rules_table.rs
//! Table rendering for `promptclean rules`.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use promptclean_core::{CompiledRules, PROFANITY_MASK};

/// Builds the rules table: one row per compiled rule, then one for the denylist.
pub fn build_rules_table(pii: &CompiledRules, code: &CompiledRules, denylist_terms: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Rule", "Stage", "Category", "Token"]);

    let mut position = 1;
    for compiled in [pii, code] {
        for rule in &compiled.rules {
            table.add_row(vec![
                position.to_string(),
                rule.name.clone(),
                compiled.kind.to_string(),
                rule.category.clone(),
                rule.replace_with.clone(),
            ]);
            position += 1;
        }
    }
    if denylist_terms > 0 {
        table.add_row(vec![
            position.to_string(),
            format!("denylist ({} terms)", denylist_terms),
            "profanity".to_string(),
            "-".to_string(),
            PROFANITY_MASK.to_string(),
        ]);
    }
    table
}
