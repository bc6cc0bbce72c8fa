//! The IV Ingestion API client.
//!
//! This module provides:
//! - Client settings ([`ClientConfig`])
//! - Request execution with auth, retries and error normalization ([`IvClient`])
//! - Request payloads ([`Payload`])
//!
//! Typed API operations live in `api`.

mod api;
mod config;

#[cfg(test)]
mod api_tests;

pub use config::ClientConfig;

use std::sync::{PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorCode};
use crate::monitor::StatusCache;
use crate::rate_limit::{RateLimitSnapshot, RateLimitTracker};
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{
    HttpClient, HttpRequest, HttpResponse, IsRetryable, MultipartForm, ReqwestClient, RequestBody,
};

/// `User-Agent` sent by clients built with [`IvClient::new`].
pub const USER_AGENT: &str = concat!("iv-ingestion-rust/", env!("CARGO_PKG_VERSION"));

/// Body of an API request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No body.
    #[default]
    Empty,
    /// A JSON document, sent with `Content-Type: application/json`.
    Json(serde_json::Value),
    /// A multipart form.
    Multipart(MultipartForm),
}

impl Payload {
    /// Serializes `value` into a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns a `REQUEST_FAILED` error if `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value).map(Self::Json).map_err(|e| {
            ApiError::new(
                format!("Request failed: {e}"),
                ErrorCode::REQUEST_FAILED,
                0,
            )
            .with_source(e)
        })
    }
}

/// Client for the IV Ingestion API.
///
/// Every operation goes through [`IvClient::execute`], which attaches
/// authentication, retries transient transport failures with exponential
/// backoff, records rate-limit headers and turns error responses into
/// [`ApiError`]s.
///
/// The client is `Send + Sync`; share it by reference (or in an `Arc`)
/// between concurrent operations.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation (defaults to [`ReqwestClient`])
/// - `S`: The sleeper used for retry backoff and monitor intervals
///   (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```no_run
/// use iv_ingestion::{ClientConfig, IvClient};
///
/// # async fn example() -> Result<(), iv_ingestion::ApiError> {
/// let client = IvClient::new(ClientConfig::default().with_api_key("iv_live_123"));
/// let health = client.health().await?;
/// println!("{:?}", health.data.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct IvClient<H = ReqwestClient, S = TokioSleeper> {
    config: ClientConfig,
    http: H,
    sleeper: S,
    token: RwLock<Option<String>>,
    rate_limit: RateLimitTracker,
    statuses: StatusCache,
}

impl IvClient {
    /// Creates a client backed by [`ReqwestClient`].
    ///
    /// The connection pool is created on the first request.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::USER_AGENT,
            http::HeaderValue::from_static(USER_AGENT),
        );
        for (name, value) in &config.headers {
            headers.insert(name, value.clone());
        }

        let http = ReqwestClient::new()
            .with_timeout(config.timeout)
            .with_default_headers(headers);
        Self::with_http_client(config, http)
    }
}

impl<H> IvClient<H, TokioSleeper> {
    /// Creates a client that sends requests through `http`.
    ///
    /// `config.timeout` and `config.headers` are not applied to `http`;
    /// configure the HTTP client accordingly.
    #[must_use]
    pub fn with_http_client(config: ClientConfig, http: H) -> Self {
        let token = config.token.clone();
        Self {
            config,
            http,
            sleeper: TokioSleeper,
            token: RwLock::new(token),
            rate_limit: RateLimitTracker::new(),
            statuses: StatusCache::new(),
        }
    }
}

impl<S> IvClient<ReqwestClient, S> {
    /// Releases the connection pool.
    ///
    /// The client stays usable; the next request opens a new pool.
    pub fn close(&self) {
        self.http.close();
    }
}

impl<H, S> IvClient<H, S> {
    /// Sets the sleeper used for retry backoff and monitor intervals.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> IvClient<H, S2> {
        IvClient {
            config: self.config,
            http: self.http,
            sleeper,
            token: self.token,
            rate_limit: self.rate_limit,
            statuses: self.statuses,
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub const fn http_client(&self) -> &H {
        &self.http
    }

    /// Returns the current bearer token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces (or clears) the bearer token used by later requests.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Returns the rate-limit state reported by the most recent response
    /// that carried it.
    #[must_use]
    pub fn get_rate_limit_info(&self) -> Option<RateLimitSnapshot> {
        self.rate_limit.snapshot()
    }

    /// Returns the authentication header for the next request.
    ///
    /// A bearer token takes precedence over the API key.
    fn auth_header(&self) -> Result<Option<(http::HeaderName, http::HeaderValue)>, ApiError> {
        let (name, value) = if let Some(token) = self.token() {
            (http::header::AUTHORIZATION, format!("Bearer {token}"))
        } else if let Some(key) = &self.config.api_key {
            (http::HeaderName::from_static("x-api-key"), key.clone())
        } else {
            return Ok(None);
        };

        let mut value = http::HeaderValue::from_str(&value).map_err(|e| {
            ApiError::new(
                format!("Request failed: invalid credentials header: {e}"),
                ErrorCode::REQUEST_FAILED,
                0,
            )
        })?;
        value.set_sensitive(true);
        Ok(Some((name, value)))
    }

    /// Builds the request for `path` relative to the base URL.
    fn build_request(
        &self,
        method: http::Method,
        path: &str,
        payload: Payload,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.config.url_for(path).map_err(ApiError::request_failed)?;
        let mut request = HttpRequest::new(method, url);

        if let Some((name, value)) = self.auth_header()? {
            request.headers.insert(name, value);
        }

        request.body = match payload {
            Payload::Empty => RequestBody::Empty,
            Payload::Json(value) => {
                request.headers.insert(
                    http::header::CONTENT_TYPE,
                    http::HeaderValue::from_static("application/json"),
                );
                RequestBody::Bytes(value.to_string().into_bytes())
            }
            Payload::Multipart(form) => RequestBody::Multipart(form),
        };

        Ok(request)
    }
}

impl<H: HttpClient, S: Sleeper> IvClient<H, S> {
    /// Sends a request and returns the successful response.
    ///
    /// Transient transport failures are retried according to the configured
    /// [`crate::RetryPolicy`]; responses with status >= 400 are not.
    ///
    /// # Errors
    ///
    /// - `REQUEST_FAILED` (status 0) when the request cannot be built or
    ///   transport failures outlast the retry policy
    /// - The normalized server error for responses with status >= 400
    pub async fn execute(
        &self,
        method: http::Method,
        path: &str,
        payload: Payload,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(method, path, payload)?;
        let response = self.send_with_retry(request).await?;

        self.rate_limit.observe(&response.headers);

        if response.is_error() {
            return Err(ApiError::normalize(
                response.status.as_u16(),
                &response.body,
            ));
        }
        Ok(response)
    }

    /// Sends a request and decodes the JSON response body.
    ///
    /// # Errors
    ///
    /// As [`IvClient::execute`], plus `UNKNOWN_ERROR` ("Invalid JSON
    /// response") when a successful body does not decode into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: http::Method,
        path: &str,
        payload: Payload,
    ) -> Result<T, ApiError> {
        let response = self.execute(method, path, payload).await?;
        serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::invalid_response(response.status.as_u16(), e))
    }

    /// Sends `request`, retrying transient failures.
    async fn send_with_retry(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let policy = self.config.retry;
        let mut attempt = 0;

        loop {
            if self.config.debug {
                tracing::debug!(method = %request.method, url = %request.url, attempt, "Sending request");
            }

            match self.http.request(request.clone()).await {
                Ok(response) => {
                    if self.config.debug {
                        tracing::debug!(status = %response.status, url = %request.url, "Received response");
                    }
                    return Ok(response);
                }
                Err(error) if error.is_retryable() && policy.should_retry(attempt) => {
                    let delay = policy.delay_for_retry(attempt);
                    tracing::warn!(
                        url = %request.url,
                        retry = attempt + 1,
                        max_retries = policy.max_retries,
                        ?delay,
                        %error,
                        "Request failed, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(ApiError::request_failed(error)),
            }
        }
    }
}
