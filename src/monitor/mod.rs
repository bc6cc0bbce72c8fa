//! Processing monitor.
//!
//! This module provides:
//! - A polling stream of progress snapshots ([`ProcessingStream`])
//! - The adaptive interval rule ([`poll_interval_for`])
//! - The latest-status cache shared with the client ([`StatusCache`])

mod cache;
mod stream;


pub use cache::StatusCache;
pub use stream::{
    LATE_INTERVAL, MID_INTERVAL, ProcessingStream, ProgressSource, SLOW_START_INTERVAL,
    poll_interval_for,
};
