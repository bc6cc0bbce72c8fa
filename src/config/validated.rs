//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use url::Url;

use crate::client::ClientConfig;
use crate::retry::RetryPolicy;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Settings for the API client
    pub client: ClientConfig,

    /// Config file the settings were read from, if any
    pub source: Option<PathBuf>,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self
            .source
            .as_ref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string());
        let auth = if self.client.token.is_some() {
            "token"
        } else if self.client.api_key.is_some() {
            "api-key"
        } else {
            "none"
        };

        write!(
            f,
            "Config {{ base_url: {}, auth: {}, timeout: {}s, retry: {}x/{}ms, debug: {}, \
             headers: {}, file: {} }}",
            self.client.base_url,
            auth,
            self.client.timeout.as_secs(),
            self.client.retry.max_retries,
            self.client.retry.base_delay.as_millis(),
            self.client.debug,
            self.client.headers.len(),
            source,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values, which take
    /// precedence over built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The base URL is not an absolute http(s) URL
    /// - The timeout is zero or the retry delay is negative or not finite
    /// - Header format is invalid
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let base_url = Self::resolve_base_url(cli, toml)?;
        let timeout = Self::resolve_timeout(cli, toml)?;
        let retry = Self::build_retry_policy(cli, toml)?;
        let headers = Self::resolve_headers(cli, toml)?;

        let mut client = ClientConfig::new(base_url)
            .with_timeout(timeout)
            .with_retry_policy(retry)
            .with_headers(headers)
            // Flags only enable: once set in TOML the CLI cannot turn it off.
            .with_debug(cli.debug || toml.is_some_and(|t| t.api.debug));

        // CLI wins, then TOML
        client.api_key = cli
            .api_key
            .clone()
            .or_else(|| toml.and_then(|t| t.api.api_key.clone()));
        client.token = cli
            .token
            .clone()
            .or_else(|| toml.and_then(|t| t.api.token.clone()));

        Ok(Self {
            client,
            source: None,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// Reads `cli.config` if set; otherwise reads the default config file
    /// when it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let path = cli
            .config
            .clone()
            .or_else(|| defaults::config_path().filter(|p| p.is_file()));

        let toml = path.as_deref().map(TomlConfig::load).transpose()?;

        let mut config = Self::from_raw(cli, toml.as_ref())?;
        config.source = path;
        Ok(config)
    }

    fn resolve_base_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let url_str = cli
            .base_url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.api.base_url.as_deref()))
            .unwrap_or(defaults::BASE_URL);

        let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(url_str.to_string())
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.api.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn build_retry_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetryPolicy, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        // Priority: CLI explicit > TOML > default
        let max_retries = cli
            .retry_max
            .or_else(|| retry.and_then(|r| r.max_retries))
            .unwrap_or(defaults::RETRY_MAX_RETRIES);

        let base_delay_secs = cli
            .retry_delay
            .or_else(|| retry.and_then(|r| r.base_delay))
            .unwrap_or(defaults::RETRY_BASE_DELAY_SECS);

        let base_delay =
            Duration::try_from_secs_f64(base_delay_secs).map_err(|e| ConfigError::InvalidDuration {
                field: "retry_delay",
                reason: e.to_string(),
            })?;

        Ok(RetryPolicy::new()
            .with_max_retries(max_retries)
            .with_base_delay(base_delay))
    }

    fn resolve_headers(cli: &Cli, toml: Option<&TomlConfig>) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();

        // Add TOML headers first (CLI can override)
        if let Some(toml) = toml {
            for (name, value) in &toml.api.headers {
                let header_name = parse_header_name(name)?;
                let header_value = parse_header_value(name, value)?;
                headers.insert(header_name, header_value);
            }
        }

        for header_str in &cli.headers {
            let (name, value) = parse_header_string(header_str)?;
            let header_name = parse_header_name(&name)?;
            let header_value = parse_header_value(&name, &value)?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

/// Writes the default configuration template to a file.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let to_error = |e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_error)?;
    }

    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(to_error)
}

/// Resolves where `init` writes the template.
///
/// # Errors
///
/// Returns an error if no path is given and the platform has no config directory.
pub fn init_output_path(output: Option<&Path>) -> Result<PathBuf, ConfigError> {
    output
        .map(Path::to_path_buf)
        .or_else(defaults::config_path)
        .ok_or_else(|| {
            ConfigError::missing(
                field::OUTPUT,
                "No user config directory found; pass --output",
            )
        })
}

// Helper functions

fn parse_header_string(s: &str) -> Result<(String, String), ConfigError> {
    // Try "Key=Value" format first
    if let Some((name, value)) = s.split_once('=') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    // Try "Key: Value" format
    if let Some((name, value)) = s.split_once(':') {
        return Ok((name.trim().to_string(), value.trim().to_string()));
    }

    Err(ConfigError::InvalidHeader {
        value: s.to_string(),
    })
}

fn parse_header_name(name: &str) -> Result<HeaderName, ConfigError> {
    name.parse::<HeaderName>()
        .map_err(|e| ConfigError::InvalidHeaderName {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
