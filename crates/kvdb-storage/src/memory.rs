//! Memory engine - ordered in-memory key-value store
//!
//! Keys are kept in a `BTreeMap`, so a cursor is simply a range over the map
//! starting at the requested key.

use kvdb_core::{Cursor, Engine, Item, Result};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Bound;

/// In-memory backend
#[derive(Debug, Default)]
pub struct MemoryEngine {
    data: BTreeMap<String, String>,
}

impl MemoryEngine {
    /// Creates an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine preloaded with `entries`
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Inserts or replaces a value without going through the `Engine` trait
    pub fn insert(&mut self, key: String, value: String) {
        self.data.insert(key, value);
    }

    /// Returns the number of stored keys
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a cursor starting at the first key `>= key`
    pub fn cursor(&self, key: &str) -> RangeCursor<'_> {
        RangeCursor {
            range: self
                .data
                .range::<str, _>((Bound::Included(key), Bound::Unbounded)),
        }
    }
}

impl Engine for MemoryEngine {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn find(&self, key: &str) -> Result<Box<dyn Cursor + '_>> {
        Ok(Box::new(self.cursor(key)))
    }
}

/// Cursor over a `BTreeMap` range
pub struct RangeCursor<'a> {
    range: btree_map::Range<'a, String, String>,
}

impl Cursor for RangeCursor<'_> {
    fn next_item(&mut self) -> Result<Option<Item>> {
        Ok(self.range.next().map(|(k, v)| Item::new(k.clone(), v.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(cursor: &mut dyn Cursor) -> Vec<Item> {
        let mut items = Vec::new();
        while let Some(item) = cursor.next_item().unwrap() {
            items.push(item);
        }
        items
    }

    #[test]
    fn test_get_put() {
        let mut engine = MemoryEngine::new();
        assert!(engine.is_empty());

        engine.put("key1", "value1").unwrap();
        engine.put("key2", "value2").unwrap();

        assert_eq!(engine.get("key1").unwrap(), Some("value1".to_string()));
        assert_eq!(engine.get("key3").unwrap(), None);
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_put_overwrites() {
        let mut engine = MemoryEngine::new();
        engine.put("counter", "1").unwrap();
        engine.put("counter", "2").unwrap();

        assert_eq!(engine.get("counter").unwrap(), Some("2".to_string()));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_cursor_positioned_at_or_after_key() {
        let engine = MemoryEngine::with_entries([("a", "1"), ("c", "3"), ("e", "5")]);

        let mut cursor = engine.find("b").unwrap();
        assert_eq!(
            drain(cursor.as_mut()),
            vec![Item::new("c", "3"), Item::new("e", "5")]
        );

        let mut cursor = engine.find("c").unwrap();
        assert_eq!(cursor.next_item().unwrap(), Some(Item::new("c", "3")));
    }

    #[test]
    fn test_cursor_exhaustion_is_terminal() {
        let engine = MemoryEngine::with_entries([("a", "1")]);
        let mut cursor = engine.find("").unwrap();

        assert_eq!(cursor.next_item().unwrap(), Some(Item::new("a", "1")));
        assert_eq!(cursor.next_item().unwrap(), None);
        assert_eq!(cursor.next_item().unwrap(), None);
    }

    #[test]
    fn test_cursor_past_last_key() {
        let engine = MemoryEngine::with_entries([("a", "1")]);
        let mut cursor = engine.find("z").unwrap();
        assert_eq!(cursor.next_item().unwrap(), None);
    }
}
