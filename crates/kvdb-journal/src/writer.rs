// Journal writer - appends framed records to a single journal file
//
// Frames are staged in `pending` and written with one `write_all`. A failed
// append leaves both the file and `pending` as they were before the call, so
// a record reported as failed can never reach disk later.

use crate::record::JournalRecord;
use kvdb_core::{Error, Result, SyncMode};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Staged bytes that force a write in `SyncMode::None`
const BUFFER_CAPACITY: usize = 64 * 1024;

pub struct JournalWriter {
    file: File,
    path: PathBuf,
    /// Bytes known to be in the file
    written: u64,
    pending: Vec<u8>,
    sync_mode: SyncMode,
    appended: u64,
}

impl JournalWriter {
    /// Open `path` for appending, creating the file and its parent directory
    /// if needed.
    pub fn open(path: impl AsRef<Path>, sync_mode: SyncMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!("Failed to create journal directory: {}", e))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::Storage(format!("Failed to open journal {:?}: {}", path, e)))?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            file,
            path,
            written,
            pending: Vec::with_capacity(BUFFER_CAPACITY),
            sync_mode,
            appended: 0,
        })
    }

    /// Append a record, returning how many records this writer has appended
    pub fn append(&mut self, record: &JournalRecord) -> Result<u64> {
        let encoded = record.encode()?;
        let mark = self.pending.len();
        self.pending.extend_from_slice(&encoded);

        let result = match self.sync_mode {
            SyncMode::Sync => self.write_pending().and_then(|()| self.sync_file()),
            SyncMode::Flush => self.write_pending(),
            SyncMode::None if self.pending.len() >= BUFFER_CAPACITY => self.write_pending(),
            SyncMode::None => Ok(()),
        };

        if let Err(e) = result {
            if self.pending.len() > mark {
                // Never reached the file
                self.pending.truncate(mark);
            } else {
                // Written but not synced
                let frame_start = self.written - encoded.len() as u64;
                if let Err(undo) = self.file.set_len(frame_start) {
                    tracing::error!(
                        error = %undo,
                        path = %self.path.display(),
                        "failed to roll back journal record"
                    );
                }
                self.written = frame_start;
            }
            return Err(e);
        }

        self.appended += 1;
        Ok(self.appended)
    }

    /// Write staged records to the OS
    pub fn flush(&mut self) -> Result<()> {
        self.write_pending()
    }

    /// Write staged records and fsync
    pub fn sync(&mut self) -> Result<()> {
        self.write_pending()?;
        self.sync_file()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current journal size in bytes, staged records included
    pub fn size(&self) -> u64 {
        self.written + self.pending.len() as u64
    }

    /// Write all of `pending`; on failure cut the file back so a partial
    /// write leaves nothing behind, and keep `pending` untouched.
    fn write_pending(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.file.write_all(&self.pending) {
            let _ = self.file.set_len(self.written);
            return Err(Error::Storage(format!("Failed to write journal record: {}", e)));
        }
        self.written += self.pending.len() as u64;
        self.pending.clear();
        Ok(())
    }

    fn sync_file(&mut self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|e| Error::Storage(format!("Failed to sync journal: {}", e)))
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        // Best effort sync on drop
        let _ = self.sync();
    }
}
