//! Terminal logging initialization for the feedvault CLI.

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, ConfigBuilder, TermLogger, TerminalMode};

/// Initialize a terminal logger. Honors `FEEDVAULT_LOG` for the level
/// (`debug`, `info`, `warn`, `error`); defaults to warnings only so that
/// normal command output stays clean.
pub fn initialize() {
    let level = match std::env::var("FEEDVAULT_LOG").ok().as_deref() {
        Some("debug") => LevelFilter::Debug,
        Some("info") => LevelFilter::Info,
        Some("error") => LevelFilter::Error,
        _ => LevelFilter::Warn,
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        build_config(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}
