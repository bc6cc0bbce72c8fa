//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// API connection section
    #[serde(default)]
    pub api: ApiSection,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetrySection,
}

/// API connection section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    /// API base URL
    pub base_url: Option<String>,

    /// API key sent as X-API-Key
    pub api_key: Option<String>,

    /// Bearer token
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: Option<u64>,

    /// Log every request and response
    #[serde(default)]
    pub debug: bool,

    /// Extra HTTP headers as key-value pairs
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Retries after the first attempt
    pub max_retries: Option<u32>,

    /// Delay before the first retry in seconds
    pub base_delay: Option<f64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# IV Ingestion client configuration
#
# Values given on the command line take precedence over this file.

[api]
# API base URL (default: https://api.iv-ingestion.com/v1)
# base_url = "https://api.iv-ingestion.com/v1"

# API key sent as X-API-Key (or set IV_API_KEY)
# api_key = "iv_live_..."

# Bearer token, takes precedence over the API key (or set IV_TOKEN)
# token = "..."

# Request timeout in seconds (default: 30)
timeout = 30

# Log every request and response
# debug = false

# Extra HTTP headers
# [api.headers]
# X-Custom-Header = "value"

[retry]
# Retries after a connection failure or timeout (default: 3)
# API errors are never retried.
max_retries = 3

# Delay before the first retry in seconds, doubled for each retry (default: 1.0)
base_delay = 1.0
"#
    .to_string()
}
