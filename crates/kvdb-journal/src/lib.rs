//! # KVDB Journal
//!
//! Append-only record journal backing the durable KVDB backend.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of KVDB.**
//!
//! Users should depend on the main [`kvdb`](https://crates.io/crates/kvdb) crate
//! instead, which provides the stable public API. This crate's API may change
//! without notice between minor versions.
//!
//! ---
//!
//! Every write is framed as `[length][type][payload][crc32]` and appended to a
//! single file. On open, the file is replayed front to back; an incomplete
//! trailing frame left by a crash is dropped and the file is truncated back
//! to its last complete record. The dropped bytes are kept next to the
//! journal in `<file>.torn`. Corruption anywhere else fails the open.

use kvdb_core::{Result, SyncMode};
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

pub mod reader;
pub mod record;
pub mod writer;

pub use reader::JournalReader;
pub use record::{JournalRecord, RecordType};
pub use writer::JournalWriter;

/// Outcome of replaying a journal on open
#[derive(Debug, Default)]
pub struct ReplayStats {
    /// Records replayed
    pub records: u64,
    /// Bytes of the incomplete trailing frame that were discarded
    pub truncated_bytes: u64,
}

/// A journal file: replayed once on open, appended to afterwards
pub struct Journal {
    path: PathBuf,
    writer: JournalWriter,
}

impl Journal {
    /// Open the journal at `path`, feeding every stored record to `apply`.
    ///
    /// A torn tail is cut off before the writer is opened so new records are
    /// never appended behind garbage.
    pub fn open<F>(path: impl AsRef<Path>, sync_mode: SyncMode, mut apply: F) -> Result<(Self, ReplayStats)>
    where
        F: FnMut(JournalRecord),
    {
        let path = path.as_ref().to_path_buf();
        let mut stats = ReplayStats::default();

        if path.exists() {
            let mut reader = JournalReader::open(&path)?;
            while let Some(record) = reader.next_record()? {
                apply(record);
                stats.records += 1;
            }

            if reader.has_torn_tail() {
                stats.truncated_bytes = cut_torn_tail(&path, reader.valid_len())?;
            }
        }

        let writer = JournalWriter::open(&path, sync_mode)?;
        tracing::debug!(
            path = %path.display(),
            records = stats.records,
            truncated_bytes = stats.truncated_bytes,
            "journal opened"
        );

        Ok((Self { path, writer }, stats))
    }

    /// Append a record
    pub fn append(&mut self, record: &JournalRecord) -> Result<()> {
        self.writer.append(record).map(|_| ())
    }

    /// Force buffered records to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.sync()
    }

    /// Journal file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current journal size in bytes
    pub fn size(&self) -> u64 {
        self.writer.size()
    }
}

/// Where the bytes dropped from a torn tail are kept
pub fn torn_tail_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".torn");
    PathBuf::from(name)
}

/// Move everything past `valid_len` into the side file and truncate.
/// Returns the number of bytes removed.
fn cut_torn_tail(path: &Path, valid_len: u64) -> Result<u64> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let mut tail = Vec::new();
    file.seek(SeekFrom::Start(valid_len))?;
    file.read_to_end(&mut tail)?;

    let torn_path = torn_tail_path(path);
    std::fs::write(&torn_path, &tail)?;
    tracing::warn!(
        path = %path.display(),
        saved_to = %torn_path.display(),
        bytes = tail.len(),
        "truncating incomplete record at end of journal"
    );

    file.set_len(valid_len)?;
    file.sync_all()?;
    Ok(tail.len() as u64)
}
