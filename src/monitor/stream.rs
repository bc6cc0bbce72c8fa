//! Processing progress stream.
//!
//! This module provides [`ProcessingStream`], a stream that polls a file's
//! processing status with an interval adapted to its progress and yields
//! each observed [`ProgressSnapshot`].

use super::StatusCache;
use crate::error::ApiError;
use crate::models::ProgressSnapshot;
use crate::time::Sleeper;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;
use tokio_stream::Stream;

/// Poll interval while progress is below 10%.
pub const SLOW_START_INTERVAL: Duration = Duration::from_secs(2);
/// Poll interval while progress is below 50%.
pub const MID_INTERVAL: Duration = Duration::from_secs(5);
/// Poll interval from 50% onwards.
pub const LATE_INTERVAL: Duration = Duration::from_secs(10);

/// Returns the wait before the next poll after observing `progress`.
#[must_use]
pub fn poll_interval_for(progress: f64) -> Duration {
    if progress < 10.0 {
        SLOW_START_INTERVAL
    } else if progress < 50.0 {
        MID_INTERVAL
    } else {
        LATE_INTERVAL
    }
}

/// Source of processing progress for a file.
///
/// Implemented by [`crate::IvClient`]; tests provide scripted sources.
pub trait ProgressSource: Send + Sync {
    /// Fetches the current progress of `file_id`.
    fn fetch_progress(
        &self,
        file_id: &str,
    ) -> impl Future<Output = Result<ProgressSnapshot, ApiError>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

enum State<'a> {
    Fetching(BoxFuture<'a, Result<ProgressSnapshot, ApiError>>),
    Waiting(BoxFuture<'a, ()>),
    Done,
}

/// A stream of progress snapshots for one file.
///
/// Returned by [`crate::IvClient::monitor_processing`]. The first status
/// query happens on the first poll. The stream ends right after yielding a
/// terminal snapshot, never yields an error, and stops polling as soon as
/// it is dropped.
pub struct ProcessingStream<'a, P, S> {
    source: &'a P,
    sleeper: &'a S,
    cache: &'a StatusCache,
    file_id: String,
    debug: bool,
    /// Wait applied before the next query
    interval: Duration,
    state: State<'a>,
}

impl<'a, P, S> ProcessingStream<'a, P, S>
where
    P: ProgressSource,
    S: Sleeper,
{
    /// Creates a stream for `file_id`. Nothing is fetched until it is polled.
    pub fn new(
        source: &'a P,
        sleeper: &'a S,
        cache: &'a StatusCache,
        file_id: impl Into<String>,
        debug: bool,
    ) -> Self {
        let file_id = file_id.into();
        let state = State::Fetching(fetch(source, file_id.clone()));
        Self {
            source,
            sleeper,
            cache,
            file_id,
            debug,
            interval: SLOW_START_INTERVAL,
            state,
        }
    }

    /// Returns the id of the monitored file.
    #[must_use]
    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    fn wait(&self) -> State<'a> {
        let sleeper: &'a S = self.sleeper;
        State::Waiting(Box::pin(sleeper.sleep(self.interval)))
    }
}

fn fetch<P: ProgressSource>(
    source: &P,
    file_id: String,
) -> BoxFuture<'_, Result<ProgressSnapshot, ApiError>> {
    Box::pin(async move { source.fetch_progress(&file_id).await })
}

impl<P, S> Stream for ProcessingStream<'_, P, S>
where
    P: ProgressSource,
    S: Sleeper,
{
    type Item = ProgressSnapshot;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                State::Done => return Poll::Ready(None),
                State::Waiting(sleep) => {
                    ready!(sleep.as_mut().poll(cx));
                    this.state = State::Fetching(fetch(this.source, this.file_id.clone()));
                }
                State::Fetching(query) => match ready!(query.as_mut().poll(cx)) {
                    Ok(snapshot) => {
                        this.cache.record(snapshot.clone());
                        if snapshot.is_terminal() {
                            this.state = State::Done;
                        } else {
                            this.interval = poll_interval_for(snapshot.progress);
                            this.state = this.wait();
                        }
                        return Poll::Ready(Some(snapshot));
                    }
                    // Errors never end the stream: wait out the current interval and query again.
                    Err(error) => {
                        if this.debug {
                            tracing::debug!(
                                file_id = %this.file_id,
                                retry_in = ?this.interval,
                                error = %error,
                                "Failed to fetch processing status"
                            );
                        }
                        this.state = this.wait();
                    }
                },
            }
        }
    }
}
