//! Latest-known processing status per file.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::models::ProgressSnapshot;

/// Latest [`ProgressSnapshot`] per file id.
///
/// Entries are written by processing streams and stay until explicitly
/// forgotten or cleared.
#[derive(Debug, Default)]
pub struct StatusCache {
    entries: RwLock<HashMap<String, ProgressSnapshot>>,
}

impl StatusCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `snapshot` as the latest status of its file.
    pub fn record(&self, snapshot: ProgressSnapshot) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(snapshot.file_id.clone(), snapshot);
    }

    /// Returns the latest status of `file_id`.
    #[must_use]
    pub fn get(&self, file_id: &str) -> Option<ProgressSnapshot> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file_id)
            .cloned()
    }

    /// Returns a copy of every cached status.
    #[must_use]
    pub fn all(&self) -> HashMap<String, ProgressSnapshot> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes the entry for `file_id`, returning it if present.
    pub fn forget(&self, file_id: &str) -> Option<ProgressSnapshot> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(file_id)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
