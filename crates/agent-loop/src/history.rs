//! Executed-action history and loop detection.

use page_model::ActionHistoryEntry;

/// Accumulates executed actions for one task run and refuses the entry
/// that would extend a full window of identical actions.
#[derive(Debug, Default)]
pub struct ActionTracker {
    entries: Vec<ActionHistoryEntry>,
    window: usize,
}

impl ActionTracker {
    pub fn new(window: usize) -> Self {
        Self {
            entries: Vec::new(),
            window,
        }
    }

    pub fn record(&mut self, entry: ActionHistoryEntry) {
        self.entries.push(entry);
    }

    /// True when the last `window` recorded entries all share `entry`'s
    /// signature. Checked before executing `entry`, so the loop is cut
    /// after the window fills, not after it is exceeded.
    pub fn would_loop(&self, entry: &ActionHistoryEntry) -> bool {
        if self.window == 0 || self.entries.len() < self.window {
            return false;
        }
        self.entries[self.entries.len() - self.window..]
            .iter()
            .all(|past| past.same_signature(entry))
    }

    pub fn entries(&self) -> &[ActionHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_entries(self) -> Vec<ActionHistoryEntry> {
        self.entries
    }
}
