// promptclean/src/logger.rs
//! Logger setup for the promptclean binary.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes `env_logger` on stderr.
///
/// `Some(level)` forces that level for the promptclean crates and ignores
/// `RUST_LOG`. `None` honors `RUST_LOG`, defaulting to `warn`. Calling this
/// twice is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("promptclean", level)
            .filter_module("promptclean_core", level);
        if level == LevelFilter::Off {
            builder.filter_level(LevelFilter::Off);
        }
    }
    builder.format_timestamp(None).target(env_logger::Target::Stderr);
    let _ = builder.try_init();
}
