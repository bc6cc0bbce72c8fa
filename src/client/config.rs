//! Client configuration.

use std::fmt;
use std::time::Duration;

use crate::config::defaults;
use crate::retry::RetryPolicy;
use crate::transport::HttpError;

/// Settings of an [`crate::IvClient`].
///
/// Everything here is fixed for the lifetime of the client except the
/// bearer token, which the client keeps separately so that login and
/// registration can replace it.
///
/// # Example
///
/// ```
/// use iv_ingestion::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_api_key("iv_live_123")
///     .with_timeout(Duration::from_secs(10))
///     .with_debug(true);
///
/// assert_eq!(config.base_url, "https://api.iv-ingestion.com/v1");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// API root; relative operation paths are appended to it.
    pub base_url: String,
    /// Key sent as `X-API-Key` when no token is set.
    pub api_key: Option<String>,
    /// Initial bearer token.
    pub token: Option<String>,
    /// Total timeout of a single HTTP attempt.
    pub timeout: Duration,
    /// Retry behavior for transient transport failures.
    pub retry: RetryPolicy,
    /// Log every request and response at DEBUG level.
    pub debug: bool,
    /// Extra headers sent with every request.
    pub headers: http::HeaderMap,
}

impl ClientConfig {
    /// Creates a configuration for `base_url` with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the initial bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enables or disables request logging.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets extra headers sent with every request.
    #[must_use]
    pub fn with_headers(mut self, headers: http::HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Resolves an operation path against the base URL.
    ///
    /// The base keeps its own path (e.g. `/v1`); a trailing slash on the
    /// base is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if the result is not a valid URL.
    pub fn url_for(&self, path: &str) -> Result<url::Url, HttpError> {
        let joined = format!("{}{path}", self.base_url.trim_end_matches('/'));
        url::Url::parse(&joined)
            .map_err(|e| HttpError::InvalidRequest(format!("Invalid URL '{joined}': {e}")))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            api_key: None,
            token: None,
            timeout: defaults::timeout(),
            retry: RetryPolicy::new(),
            debug: false,
            headers: http::HeaderMap::new(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("debug", &self.debug)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}
