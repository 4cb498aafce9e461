// promptclean/src/main.rs
//! promptclean entry point.
//!
//! Loads `.env`, initializes logging and dispatches to the subcommand.

use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;
use log::LevelFilter;
use std::process::ExitCode;

use promptclean::cli::{Cli, Commands};
use promptclean::commands::{rules, sanitize};
use promptclean::logger;
use promptclean::ui::output_format;

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Sanitize(cmd) => sanitize::run_sanitize(cmd, cli.quiet),
        Commands::Rules(cmd) => rules::run_rules(cmd),
    }
}

fn main() -> ExitCode {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = if cli.quiet {
        Some(LevelFilter::Off)
    } else if cli.debug {
        Some(LevelFilter::Debug)
    } else {
        None
    };
    logger::init_logger(level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let stderr = std::io::stderr();
            let supports_color = stderr.is_terminal();
            let _ = output_format::print_error_message(&mut stderr.lock(), &format!("{:#}", e), supports_color);
            ExitCode::FAILURE
        }
    }
}
