//! Terminal output helpers: status messages, the redaction summary and the
//! rules table.

pub mod output_format;
pub mod redaction_summary;
pub mod rules_table;
