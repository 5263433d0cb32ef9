//! # KVDB
//!
//! Asynchronous, serialized access to a pluggable key-value backend for
//! single-process servers.
//!
//! Callers submit `get`, `put` and `get_range` operations from any thread.
//! A single background worker executes them against the backend in
//! submission order, and each result is handed back through a
//! [`CallbackScheduler`] so it runs on the caller's own execution context
//! rather than on the worker.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kvdb::{CallbackQueue, KvdbConfig, KvdbService, OpMonitor};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The main loop owns the callback queue
//!     let callbacks = CallbackQueue::new();
//!
//!     // Persistent backend: ./data/game.players.journal
//!     let config = KvdbConfig::journal("./data", "game", "players");
//!     let kvdb = KvdbService::open(&config, Arc::new(callbacks.handle()), OpMonitor::new())?;
//!
//!     kvdb.put("player:1", "Alice", |result| {
//!         if let Err(e) = result {
//!             eprintln!("save failed: {}", e);
//!         }
//!     });
//!     kvdb.get_range("player:", "player;", |result| {
//!         for item in result.unwrap_or_default() {
//!             println!("{} = {}", item.key(), item.value());
//!         }
//!     });
//!
//!     // Tick: run whatever completed
//!     callbacks.wait_and_run(Duration::from_millis(100));
//!     Ok(())
//! }
//! ```
//!
//! ## Backends
//!
//! | `kind`    | Storage                                      |
//! |-----------|----------------------------------------------|
//! | `""`      | none, every operation fails with `Disabled`  |
//! | `memory`  | ordered in-memory map                        |
//! | `journal` | in-memory index over an append-only journal  |
//!
//! Operations have no timeout: a backend call that blocks stalls every
//! operation queued behind it.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backpressure;
pub mod logging;
mod opmon;
mod queue;
mod request;
mod scheduler;
mod serve;
mod service;
mod worker;

// Re-export core types
pub use kvdb_core::{
    BackpressureConfig, Cursor, Engine, Error, Item, KvdbConfig, Result, SyncMode,
};

// Journal components
pub use kvdb_journal::{Journal, JournalReader, JournalRecord, JournalWriter, ReplayStats};

// Storage backends
pub use kvdb_storage::{open_engine, JournalEngine, MemoryEngine, JOURNAL_KIND, MEMORY_KIND};

pub use backpressure::BackpressureMonitor;
pub use opmon::{OpMonitor, OpStats, Operation};
pub use queue::OperationQueue;
pub use request::{GetCallback, GetRangeCallback, PutCallback, Request};
pub use scheduler::{Callback, CallbackHandle, CallbackQueue, CallbackScheduler};
pub use serve::{serve_forever, RESTART_DELAY};
pub use service::KvdbService;
pub use worker::{scan_range, WORKER_THREAD_NAME};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
