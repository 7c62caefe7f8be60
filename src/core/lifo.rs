//! Last-in-first-out buffer
//!
//! Backing structure of the write-behind cache's pending writes. Entries
//! come back in reverse insertion order, so a drain cycle persists the
//! most recently pushed entry first.

/// Vec-backed stack
#[derive(Debug)]
pub struct Lifo<T> {
    items: Vec<T>,
}

impl<T> Lifo<T> {
    /// Create an empty stack
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Push an item on top of the stack
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Pop the most recently pushed item
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Drop every item
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether at least one item is waiting
    pub fn is_filled(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for Lifo<T> {
    fn default() -> Self {
        Self::new()
    }
}
