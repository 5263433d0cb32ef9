//! Backend engine contract.
//!
//! Every storage backend implements [`Engine`]. The dispatch worker owns the
//! engine exclusively and calls it from a single thread, one call at a time,
//! so implementations need no internal synchronization.

use crate::Result;
use serde::{Deserialize, Serialize};

/// A key-value pair produced by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    key: String,
    value: String,
}

impl Item {
    /// Creates a new item
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consumes the item and returns `(key, value)`
    pub fn into_parts(self) -> (String, String) {
        (self.key, self.value)
    }
}

/// Forward-only iterator over stored entries in ascending key order.
///
/// A cursor is not restartable. `Ok(None)` is the terminal state: once it has
/// been returned the cursor holds no more items.
pub trait Cursor {
    /// Advance to the next item.
    fn next_item(&mut self) -> Result<Option<Item>>;
}

/// Storage backend capability set.
pub trait Engine: Send {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Look up a key.
    ///
    /// Returns `Ok(None)` when the key is absent; `Err` is reserved for
    /// access failures.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or update a key-value pair
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Open a cursor positioned at the first stored key `>= key`
    fn find(&self, key: &str) -> Result<Box<dyn Cursor + '_>>;
}
