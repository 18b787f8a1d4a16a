//! Bounded history of successful predictions

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::{FormInput, PredictionResult};

/// Number of predictions kept for the trend chart
pub const HISTORY_CAPACITY: usize = 5;

/// One recorded prediction together with the inputs that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub result: PredictionResult,
    pub inputs: FormInput,
    /// ISO-8601, UTC
    pub timestamp: String,
}

/// Ring buffer of the latest predictions, newest first.
///
/// Entries are never modified after insertion; recording past capacity
/// evicts the oldest one.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    next_id: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    /// Record a successful prediction and return the stored entry
    pub fn record(&mut self, result: PredictionResult, inputs: FormInput) -> HistoryEntry {
        let entry = HistoryEntry {
            id: self.next_id,
            result,
            inputs,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.next_id += 1;

        self.entries.push_front(entry.clone());
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                tracing::debug!(id = evicted.id, "evicted oldest prediction from history");
            }
        }

        entry
    }

    /// Entries, newest first
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
