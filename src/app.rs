//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use iv_ingestion::config::{ConfigError, ValidatedConfig};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid args, unreadable config file, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - network failure, API error, etc.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::FileRead { .. } | ConfigError::TomlParse(_) => {
            eprintln!("\nRun 'iv-ingestion init' to generate a configuration template.");
        }
        ConfigError::InvalidUrl { .. } => {
            eprintln!("\nThe base URL must look like 'https://api.iv-ingestion.com/v1'.");
        }
        _ => {}
    }
}

/// Default log level for a resolved configuration.
///
/// `--debug` implies DEBUG, since the per-request lines are debug events.
pub const fn log_level(config: &ValidatedConfig) -> Level {
    if config.verbose || config.client.debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn setup_tracing(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use iv_ingestion::config::Cli;

    fn resolve(args: &[&str]) -> ValidatedConfig {
        let cli = Cli::parse_from_iter(args.iter().copied());
        ValidatedConfig::from_raw(&cli, None).unwrap()
    }

    #[test]
    fn default_level_is_info() {
        let config = resolve(&["iv-ingestion", "health"]);
        assert_eq!(log_level(&config), Level::INFO);
    }

    #[test]
    fn verbose_selects_debug() {
        let config = resolve(&["iv-ingestion", "--verbose", "health"]);
        assert_eq!(log_level(&config), Level::DEBUG);
    }

    #[test]
    fn debug_flag_alone_enables_request_log() {
        let config = resolve(&["iv-ingestion", "--debug", "health"]);
        assert!(config.client.debug);
        assert!(!config.verbose);
        assert_eq!(log_level(&config), Level::DEBUG);
    }
}
