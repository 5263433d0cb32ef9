//! # KVDB Core
//!
//! Core types and traits shared by the KVDB crates: the error type, the
//! service configuration, and the [`Engine`] / [`Cursor`] contract every
//! storage backend implements.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;

pub use config::{BackpressureConfig, KvdbConfig, SyncMode};
pub use engine::{Cursor, Engine, Item};
pub use error::{Error, Result};
