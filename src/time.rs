//! Time abstraction for testability.
//!
//! This module provides a [`Sleeper`] trait so that retry backoff and
//! monitor poll intervals can be observed or skipped in tests while using
//! real timers in production.

use std::future::Future;
use std::time::Duration;

/// Abstraction over async sleeping.
///
/// Every suspension point of the client that is not network I/O (retry
/// backoff, processing monitor intervals) goes through this trait.
///
/// # Example
///
/// ```
/// use iv_ingestion::time::{InstantSleeper, Sleeper};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// // Returns immediately regardless of the requested duration.
/// InstantSleeper.sleep(Duration::from_secs(3600)).await;
/// # }
/// ```
pub trait Sleeper: Send + Sync {
    /// Suspends the current task for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that never waits.
///
/// Useful in tests and for callers that drive their own pacing. It still
/// yields to the scheduler so that concurrently running tasks make progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A sleeper that records requested durations without waiting.
    #[derive(Default)]
    struct RecordingSleeper {
        calls: Mutex<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.calls.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn instant_sleeper_returns_immediately() {
        let start = std::time::Instant::now();
        InstantSleeper.sleep(Duration::from_secs(60)).await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_advances_virtual_time() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(5)).await;

        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn recording_sleeper_captures_durations() {
        let sleeper = RecordingSleeper::default();
        sleeper.sleep(Duration::from_secs(2)).await;
        sleeper.sleep(Duration::from_secs(5)).await;

        assert_eq!(
            *sleeper.calls.lock().unwrap(),
            vec![Duration::from_secs(2), Duration::from_secs(5)]
        );
    }

    #[test]
    fn sleepers_are_send_sync_copy() {
        fn assert_traits<T: Send + Sync + Copy + Default>() {}
        assert_traits::<TokioSleeper>();
        assert_traits::<InstantSleeper>();
    }
}
