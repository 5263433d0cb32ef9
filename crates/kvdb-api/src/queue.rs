//! Operation queue - unbounded multi-producer FIFO with a single consumer
//!
//! Producers append under a short mutex and never wait for the consumer.
//! The consumer parks on a condition variable while the queue is empty.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Thread-safe FIFO of pending operations
#[derive(Debug)]
pub struct OperationQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> OperationQueue<T> {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Appends `item` at the tail and wakes the consumer.
    ///
    /// Returns the queue length right after the push.
    pub fn push(&self, item: T) -> usize {
        let len = {
            let mut items = self.lock();
            items.push_back(item);
            items.len()
        };
        self.available.notify_one();
        len
    }

    /// Removes and returns the oldest item, blocking while the queue is empty
    pub fn pop(&self) -> T {
        let mut items = self.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            items = self
                .available
                .wait(items)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Removes and returns the oldest item without blocking
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Current number of queued items
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A producer that panicked while holding the lock cannot leave the deque
    // half-updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Default for OperationQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
