//! Bounded undo history of full image snapshots.

use std::collections::VecDeque;

use crate::decode::DecodedImage;

/// Default number of snapshots kept.
pub const DEFAULT_MAX_UNDO: usize = 10;

/// A LIFO stack of image snapshots that forgets its oldest entry once full.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<DecodedImage>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Store a snapshot, evicting the oldest one if the stack is full.
    pub fn push(&mut self, snapshot: DecodedImage) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// Remove and return the most recent snapshot.
    pub fn restore(&mut self) -> Option<DecodedImage> {
        self.entries.pop_back()
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

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshots from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &DecodedImage> {
        self.entries.iter()
    }
}
