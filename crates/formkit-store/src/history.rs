//! Bounded undo/redo history
//!
//! Snapshots are `Arc<Schema>`: recording one is a reference-count bump, and
//! consecutive snapshots share every subtree an edit did not touch.

use std::collections::VecDeque;
use std::sync::Arc;

use formkit_schema::Schema;

/// Past and future schema snapshots
///
/// `past` is oldest-first; `future` is nearest-first. Recording a new
/// present clears `future`. When `past` reaches capacity the oldest
/// snapshot is dropped.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Arc<Schema>>,
    future: Vec<Arc<Schema>>,
    capacity: usize,
}

impl History {
    /// Empty history keeping at most `capacity` undo steps
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(capacity.min(64)),
            future: Vec::new(),
            capacity,
        }
    }

    /// Record `previous` as the state before a committed edit
    pub fn record(&mut self, previous: Arc<Schema>) {
        self.future.clear();
        if self.capacity == 0 {
            return;
        }
        if self.past.len() == self.capacity {
            self.past.pop_front();
            tracing::trace!(capacity = self.capacity, "history full, dropped oldest snapshot");
        }
        self.past.push_back(previous);
    }

    /// Step back: returns the snapshot to make current
    ///
    /// `current` moves onto the redo stack. Returns `None` (and keeps
    /// `current` out of the stacks) when there is nothing to undo.
    pub fn undo(&mut self, current: Arc<Schema>) -> Option<Arc<Schema>> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Step forward: returns the snapshot to make current
    pub fn redo(&mut self, current: Arc<Schema>) -> Option<Arc<Schema>> {
        let next = self.future.pop()?;
        self.past.push_back(current);
        if self.past.len() > self.capacity {
            self.past.pop_front();
        }
        Some(next)
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps available
    #[inline]
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps available
    #[inline]
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
