// Common test utilities for journal integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture that owns a temporary directory holding one journal file
pub struct JournalTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub journal_path: PathBuf,
}

impl JournalTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let journal_path = temp_dir.path().join("kvdb.kv.journal");
        Self {
            temp_dir,
            journal_path,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.journal_path
    }

    pub fn file_len(&self) -> u64 {
        std::fs::metadata(&self.journal_path)
            .map(|m| m.len())
            .unwrap_or(0)
    }
}

impl Default for JournalTestFixture {
    fn default() -> Self {
        Self::new()
    }
}
