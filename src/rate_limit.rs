//! Rate-limit header tracking.

use std::sync::{PoisonError, RwLock};

use http::HeaderMap;
use serde::Serialize;

/// Header carrying the request quota of the current window.
pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
/// Header carrying the requests left in the current window.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
/// Header carrying the window reset time (epoch seconds).
pub const RESET_HEADER: &str = "x-ratelimit-reset";
/// Header carrying the server's suggested wait in seconds.
pub const RETRY_AFTER_HEADER: &str = "retry-after";

/// Rate-limit state reported by the most recent response that carried it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitSnapshot {
    /// Requests allowed per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// When the window resets, in epoch seconds.
    pub reset: u64,
    /// Suggested wait before retrying, in seconds.
    pub retry_after: Option<u64>,
}

impl RateLimitSnapshot {
    /// Parses a snapshot from response headers.
    ///
    /// Returns `None` unless limit, remaining and reset are all present and
    /// numeric. A missing or non-numeric `Retry-After` yields `retry_after: None`.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Some(Self {
            limit: header_u64(headers, LIMIT_HEADER)?,
            remaining: header_u64(headers, REMAINING_HEADER)?,
            reset: header_u64(headers, RESET_HEADER)?,
            retry_after: header_u64(headers, RETRY_AFTER_HEADER),
        })
    }

    /// Returns true if no requests are left in the current window.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Holds the best-known [`RateLimitSnapshot`].
///
/// Responses without the rate-limit headers leave the previous snapshot in
/// place, so the value may be stale: treat it as "last reported", not "current".
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    snapshot: RwLock<Option<RateLimitSnapshot>>,
}

impl RateLimitTracker {
    /// Creates a tracker with no snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspects response headers, replacing the snapshot if they carry one.
    ///
    /// Returns true if the snapshot was replaced.
    pub fn observe(&self, headers: &HeaderMap) -> bool {
        let Some(snapshot) = RateLimitSnapshot::from_headers(headers) else {
            return false;
        };

        if snapshot.is_exhausted() {
            tracing::warn!(
                limit = snapshot.limit,
                reset = snapshot.reset,
                retry_after = snapshot.retry_after,
                "Rate limit exhausted"
            );
        }

        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        true
    }

    /// Returns the last observed snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<RateLimitSnapshot> {
        *self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }
}
