//! Errors raised while resolving the CLI's connection settings.

use std::path::PathBuf;

use thiserror::Error;

/// Why the command line, config file or `init` target was rejected.
///
/// Any of these stops the CLI before a request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `--config` file (or the default one) exists but could not be read.
    #[error("Cannot read config file '{}': {source}", path.display())]
    FileRead {
        /// File that was opened
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown `[api]`/`[retry]` keys.
    #[error("Config file is not valid: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// `init` could not write the template.
    #[error("Cannot write config template to '{}': {source}", path.display())]
    FileWrite {
        /// Destination of the template
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// `init` got no `--output` and the platform has no config directory.
    #[error("No {field} given. {hint}")]
    MissingRequired {
        /// Option that needs a value
        field: &'static str,
        /// What the user should pass instead
        hint: &'static str,
    },

    /// `--base-url` / `api.base_url` does not parse or is not http(s).
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidUrl {
        /// Value as given
        url: String,
        /// Parser or scheme complaint
        reason: String,
    },

    /// Request timeout or retry delay out of range.
    #[error("Invalid {field}: {reason}")]
    InvalidDuration {
        /// `timeout` or `retry_delay`
        field: &'static str,
        /// Range complaint
        reason: String,
    },

    /// An extra `--header` without a `=` or `:` separator.
    #[error("Invalid extra header '{value}': use 'Name=Value' or 'Name: Value'")]
    InvalidHeader {
        /// Raw argument
        value: String,
    },

    /// An extra header whose name is not a valid HTTP token.
    #[error("Invalid extra header name '{name}': {reason}")]
    InvalidHeaderName {
        /// Rejected name
        name: String,
        /// Parser complaint
        reason: String,
    },

    /// An extra header whose value has bytes HTTP does not allow.
    #[error("Invalid value for extra header '{name}': {reason}")]
    InvalidHeaderValue {
        /// Header the value belongs to
        name: String,
        /// Parser complaint
        reason: String,
    },
}

/// Option names reported by [`ConfigError::MissingRequired`].
pub mod field {
    /// `init --output`.
    pub const OUTPUT: &str = "output path";
}

impl ConfigError {
    /// Shorthand for [`ConfigError::MissingRequired`].
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
