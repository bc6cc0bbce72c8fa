//! Configuration layer for the `iv-ingestion` command-line client.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`]) producing a [`crate::ClientConfig`]
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values passed on the command line or via
//!    `IV_*` environment variables
//! 2. **TOML config file** - `--config`, or `<config_dir>/iv-ingestion/config.toml`
//!    when it exists
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! Headers from both sources are merged; a CLI header replaces a TOML header
//! of the same name.
//!
//! # Boolean Flag Semantics
//!
//! `--debug` uses OR semantics: if set in either CLI or TOML, the result is
//! `true`.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command, InspectionStatusArg, InspectionsArgs, UploadArgs, WebhookCommand};
pub use error::{ConfigError, field};
pub use toml::{ApiSection, RetrySection, TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, init_output_path, write_default_config};
