//! Bounded list of past calculations, newest first.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of entries kept (and persisted).
pub const HISTORY_CAP: usize = 50;

/// One past calculation.
///
/// Field names on disk are `expr`, `result` and `ts`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "expr")]
    pub expression: String,
    pub result: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "ts")]
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(expression: impl Into<String>, result: impl Into<String>, timestamp: i64) -> Self {
        Self {
            expression: expression.into(),
            result: result.into(),
            timestamp,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries (newest first), dropping anything past the cap.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut entries = VecDeque::from(entries);
        entries.truncate(HISTORY_CAP);
        Self { entries }
    }

    /// Record a new entry at the front, evicting the oldest past the cap.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAP);
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Remove the entry at `index`. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<HistoryEntry> {
        self.entries.remove(index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The newest `limit` entries.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().take(limit)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<HistoryEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }
}
