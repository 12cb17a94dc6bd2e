//! Bounded action history with snapshots.
//!
//! Entries are stored oldest first. Once the log is full, recording a new
//! entry evicts the oldest one. Restoring never removes entries.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of entries kept when no capacity is given.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Format of [`HistoryEntry::timestamp`].
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Label such as `Cleaned text`
    pub action: String,
    /// Local wall-clock time the action was recorded
    pub timestamp: String,
    /// Serialized markup after the action
    pub snapshot: String,
}

/// Fixed-capacity log of recent actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryLog {
    /// Creates an empty log holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records an action stamped with the current local time.
    pub fn record(&mut self, action: impl Into<String>, snapshot: impl Into<String>) {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.record_at(action, timestamp, snapshot);
    }

    /// Records an action with an explicit timestamp.
    pub fn record_at(
        &mut self,
        action: impl Into<String>,
        timestamp: impl Into<String>,
        snapshot: impl Into<String>,
    ) {
        let entry = HistoryEntry {
            action: action.into(),
            timestamp: timestamp.into(),
            snapshot: snapshot.into(),
        };
        log::debug!("history: {} at {}", entry.action, entry.timestamp);
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Returns the entry at `index` (0 is the oldest) for restoring.
    ///
    /// The log is not changed. The caller installs the snapshot and then
    /// records its own `Restored: ...` entry.
    pub fn restore(&self, index: usize) -> Result<&HistoryEntry> {
        self.entries.get(index).ok_or_else(|| Error::HistoryIndex {
            index,
            len: self.entries.len(),
        })
    }

    /// Gets an entry by index (0 is the oldest).
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Most recently recorded entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// `(index, entry)` pairs newest first, as shown to users.
    pub fn newest_first(&self) -> impl Iterator<Item = (usize, &HistoryEntry)> {
        self.entries.iter().enumerate().rev()
    }
}
