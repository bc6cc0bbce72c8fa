//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Default API root.
pub const BASE_URL: &str = "https://api.iv-ingestion.com/v1";

/// Default per-attempt request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default number of retries after the first attempt.
pub const RETRY_MAX_RETRIES: u32 = crate::retry::RetryPolicy::DEFAULT_MAX_RETRIES;

/// Default delay before the first retry, in seconds.
pub const RETRY_BASE_DELAY_SECS: f64 = 1.0;

/// Default number of concurrent uploads in a batch.
pub const MAX_CONCURRENT_UPLOADS: usize = crate::batch::DEFAULT_MAX_CONCURRENT;

/// Directory under the user config dir holding the config file.
pub const CONFIG_DIR_NAME: &str = "iv-ingestion";

/// Name of the config file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default request timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}

/// Default config file location: `<config_dir>/iv-ingestion/config.toml`.
///
/// Returns `None` if the platform has no user config directory.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
