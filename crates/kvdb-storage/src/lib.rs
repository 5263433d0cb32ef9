//! # KVDB Storage
//!
//! Storage backends for KVDB.
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
//! Two backends are provided, selected by the `kind` field of
//! [`KvdbConfig`]:
//!
//! - **memory**: ordered `BTreeMap`, lost on exit
//! - **journal**: the same index rebuilt on open from an append-only journal
//!   stored at `<url>/<db>.<collection>.journal`

use kvdb_core::{Engine, Error, KvdbConfig, Result};
use std::path::PathBuf;

pub mod journal;
pub mod memory;

pub use journal::JournalEngine;
pub use memory::{MemoryEngine, RangeCursor};

/// Backend kind for [`MemoryEngine`]
pub const MEMORY_KIND: &str = "memory";
/// Backend kind for [`JournalEngine`]
pub const JOURNAL_KIND: &str = "journal";

/// Open the backend named by `config.kind`.
///
/// Returns `Ok(None)` when no backend is configured. Any failure to open a
/// configured backend is reported as [`Error::Initialization`].
pub fn open_engine(config: &KvdbConfig) -> Result<Option<Box<dyn Engine>>> {
    if !config.is_enabled() {
        return Ok(None);
    }

    let engine: Box<dyn Engine> = match config.kind.as_str() {
        MEMORY_KIND => Box::new(MemoryEngine::new()),
        JOURNAL_KIND => {
            let path = journal_path(config)?;
            let engine = JournalEngine::open(&path, config.sync_mode).map_err(|e| {
                Error::Initialization(format!("cannot open journal {:?}: {}", path, e))
            })?;
            Box::new(engine)
        }
        other => {
            return Err(Error::Initialization(format!(
                "unknown kvdb backend type: {:?}",
                other
            )))
        }
    };

    Ok(Some(engine))
}

/// Journal file location for a journal config
pub fn journal_path(config: &KvdbConfig) -> Result<PathBuf> {
    for (field, value) in [
        ("url", &config.url),
        ("db", &config.db),
        ("collection", &config.collection),
    ] {
        if value.is_empty() {
            return Err(Error::Initialization(format!(
                "journal backend requires a non-empty {}",
                field
            )));
        }
    }

    Ok(PathBuf::from(&config.url).join(format!("{}.{}.journal", config.db, config.collection)))
}
