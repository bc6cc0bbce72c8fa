//! Error types for HTTP operations.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for transport-level failures.
///
/// Describes what went wrong before a well-formed HTTP response was
/// received. Whether the failure is worth retrying is answered by
/// [`IsRetryable`].
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// connection resets and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    ///
    /// The server did not respond within the configured timeout period.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built (bad URL, bad header, bad form).
    ///
    /// This indicates a caller or configuration error rather than
    /// a transient failure.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A file referenced by a multipart form could not be opened.
    #[error("Failed to read upload file '{}': {source}", path.display())]
    File {
        /// Path of the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Extension trait for checking if an error is retryable.
///
/// Determines whether an error represents a transient failure that
/// warrants another attempt.
pub trait IsRetryable {
    /// Returns true if the error is potentially transient and should be retried.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for HttpError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            Self::InvalidRequest(_) | Self::File { .. } => false,
        }
    }
}
