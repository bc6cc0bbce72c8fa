//! Normalized API errors.
//!
//! Every failure surfaced by [`crate::IvClient`] is an [`ApiError`]: server
//! error envelopes, malformed responses, exhausted transport retries and
//! webhook signature mismatches all share one shape so callers can branch
//! on [`ApiError::code`] instead of message text.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::HttpError;

/// Machine-readable error code.
///
/// Server codes are open-ended strings; the associated constants are the
/// codes the client itself produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode(Cow<'static, str>);

impl ErrorCode {
    /// A transport failure that was not (or no longer) retried.
    pub const REQUEST_FAILED: Self = Self(Cow::Borrowed("REQUEST_FAILED"));

    /// A webhook signature did not match the payload.
    pub const INVALID_SIGNATURE: Self = Self(Cow::Borrowed("INVALID_SIGNATURE"));

    /// A verified webhook payload could not be decoded.
    pub const INVALID_PAYLOAD: Self = Self(Cow::Borrowed("INVALID_PAYLOAD"));

    /// The server did not provide a code, or the response was malformed.
    pub const UNKNOWN_ERROR: Self = Self(Cow::Borrowed("UNKNOWN_ERROR"));

    /// Wraps an arbitrary code string.
    #[must_use]
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for ErrorCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ErrorCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Field-level detail attached to an API error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Offending field, if the error concerns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Detail-level code, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// The error envelope returned by the API on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default = "default_message")]
    error: String,
    #[serde(default = "default_code")]
    code: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

fn default_message() -> String {
    ApiError::UNKNOWN_MESSAGE.to_string()
}

fn default_code() -> String {
    ErrorCode::UNKNOWN_ERROR.to_string()
}

/// Uniform error returned by every client operation.
///
/// Displays as `"<code> (<status>): <message>"`. `status` is the HTTP
/// status of the response, or 0 when no response was received.
#[derive(Debug, Error)]
#[error("{code} ({status}): {message}")]
pub struct ApiError {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code.
    pub code: ErrorCode,
    /// HTTP status, 0 for client-side failures.
    pub status: u16,
    /// Field-level details, in server order.
    pub details: Vec<ErrorDetail>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    /// Message used when the server omits one.
    pub const UNKNOWN_MESSAGE: &'static str = "Unknown error";

    /// Message used when a response body is not the expected shape.
    pub const INVALID_JSON_MESSAGE: &'static str = "Invalid JSON response";

    /// Creates an error with no details and no source.
    #[must_use]
    pub fn new(message: impl Into<String>, code: ErrorCode, status: u16) -> Self {
        Self {
            message: message.into(),
            code,
            status,
            details: Vec::new(),
            source: None,
        }
    }

    /// Attaches field-level details.
    #[must_use]
    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details = details;
        self
    }

    /// Attaches an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Normalizes an error response body.
    ///
    /// Reads `error`, `code` and `details`, defaulting each when absent.
    /// A body that is not a JSON object of that shape is treated as
    /// `{"error": "Invalid JSON response"}`.
    #[must_use]
    pub fn normalize(status: u16, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body).unwrap_or_else(|_| ErrorBody {
            error: Self::INVALID_JSON_MESSAGE.to_string(),
            code: default_code(),
            details: Vec::new(),
        });

        Self::new(parsed.error, ErrorCode::new(parsed.code), status).with_details(parsed.details)
    }

    /// Error for a response whose body could not be decoded into the expected type.
    #[must_use]
    pub fn invalid_response(status: u16, source: serde_json::Error) -> Self {
        Self::new(Self::INVALID_JSON_MESSAGE, ErrorCode::UNKNOWN_ERROR, status).with_source(source)
    }

    /// Error for a transport failure that will not be retried further.
    #[must_use]
    pub fn request_failed(error: HttpError) -> Self {
        Self::new(
            format!("Request failed: {error}"),
            ErrorCode::REQUEST_FAILED,
            0,
        )
        .with_source(error)
    }

    /// Returns true if the error originated in the client rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status == 0
    }
}
