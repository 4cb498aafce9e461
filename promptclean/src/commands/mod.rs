//! Subcommand implementations.

pub mod rules;
pub mod sanitize;
