//! Journal engine - durable backend built from a memory index and a journal
//!
//! Every put is appended to the journal before the in-memory index is
//! updated, so the index never holds a value that would be lost on restart.
//! Opening the engine replays the journal to rebuild the index.

use crate::memory::MemoryEngine;
use kvdb_core::{Cursor, Engine, Result, SyncMode};
use kvdb_journal::{Journal, JournalRecord};
use std::path::Path;

/// Journal-backed engine
pub struct JournalEngine {
    index: MemoryEngine,
    journal: Journal,
}

impl JournalEngine {
    /// Open or create the journal at `path` and rebuild the index from it
    pub fn open(path: impl AsRef<Path>, sync_mode: SyncMode) -> Result<Self> {
        let mut index = MemoryEngine::new();
        let (journal, stats) = Journal::open(path, sync_mode, |record| match record {
            JournalRecord::Put { key, value } => index.insert(key, value),
        })?;

        tracing::info!(
            path = %journal.path().display(),
            records = stats.records,
            keys = index.len(),
            "journal engine opened"
        );

        Ok(Self { index, journal })
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Force buffered journal records to disk
    pub fn sync(&mut self) -> Result<()> {
        self.journal.sync()
    }
}

impl Engine for JournalEngine {
    fn name(&self) -> &'static str {
        "journal"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.index.get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.journal.append(&JournalRecord::put(key, value))?;
        self.index.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn find(&self, key: &str) -> Result<Box<dyn Cursor + '_>> {
        self.index.find(key)
    }
}
