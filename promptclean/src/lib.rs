// promptclean/src/lib.rs
//! # promptclean CLI
//!
//! Command-line front end for `promptclean-core`. The binary in `main.rs`
//! only parses arguments and dispatches; everything testable lives here.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
