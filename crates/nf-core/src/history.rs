//! Bounded log of past feedback events.

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactSet;
use crate::constants::{HISTORY_RETAIN, HISTORY_SOFT_CAP};
use crate::feedback::FeedbackRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackHistoryEntry {
    pub timestamp: String,
    pub attention: f64,
    pub meditation: f64,
    pub feedback: FeedbackRecord,
    pub artifacts: ArtifactSet,
}

/// Chronological feedback log. Growing past `soft_cap` truncates it in one
/// step to the newest `retain` entries.
#[derive(Debug, Clone)]
pub struct FeedbackHistory {
    entries: Vec<FeedbackHistoryEntry>,
    soft_cap: usize,
    retain: usize,
}

impl Default for FeedbackHistory {
    fn default() -> Self {
        Self::new(HISTORY_SOFT_CAP, HISTORY_RETAIN)
    }
}

impl FeedbackHistory {
    /// `retain` is capped at `soft_cap`.
    pub fn new(soft_cap: usize, retain: usize) -> Self {
        Self {
            entries: Vec::new(),
            soft_cap,
            retain: retain.min(soft_cap),
        }
    }

    /// Push an entry; returns true if this append triggered a rotation.
    pub fn append(&mut self, entry: FeedbackHistoryEntry) -> bool {
        self.entries.push(entry);
        if self.entries.len() <= self.soft_cap {
            return false;
        }
        let dropped = self.entries.len() - self.retain;
        self.entries.drain(..dropped);
        tracing::debug!("feedback history rotated, dropped {dropped} oldest entries");
        true
    }

    /// The last `count` entries, oldest first. Non-positive counts yield an
    /// empty slice.
    pub fn recent(&self, count: i64) -> &[FeedbackHistoryEntry] {
        if count <= 0 {
            return &[];
        }
        let n = usize::try_from(count).unwrap_or(usize::MAX).min(self.entries.len());
        &self.entries[self.entries.len() - n..]
    }

    pub fn latest(&self) -> Option<&FeedbackHistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
