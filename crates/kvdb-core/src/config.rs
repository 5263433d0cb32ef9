//! Service configuration.
//!
//! Loading configuration from disk is left to the host process; these types
//! derive `Deserialize` so they can be embedded in any serde-backed config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default slow-operation threshold in milliseconds
pub const DEFAULT_SLOW_THRESHOLD_MS: u64 = 100;

/// Sync mode for journal writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Call fsync after every write (strongest durability)
    Sync,
    /// Flush the write buffer after every write, fsync only on explicit sync
    #[default]
    Flush,
    /// Leave flushing to the buffer and to drop (fastest, unsafe for crashes)
    None,
}

/// Queue-length warning thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackpressureConfig {
    /// Lengths at or below this value never warn
    pub warn_above: usize,
    /// Warnings fire on multiples of this step
    pub step: usize,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            warn_above: 100,
            step: 100,
        }
    }
}

/// KVDB configuration
///
/// An empty `kind` leaves the service disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvdbConfig {
    /// Backend kind (`memory`, `journal`), empty to disable
    #[serde(alias = "type")]
    pub kind: String,
    /// Backend location (directory for the journal backend)
    pub url: String,
    /// Database name
    pub db: String,
    /// Collection name
    pub collection: String,
    /// Operations slower than this are reported by the monitor
    pub slow_threshold_ms: u64,
    /// Sync mode for durable backends
    pub sync_mode: SyncMode,
    /// Queue-length warnings
    pub backpressure: BackpressureConfig,
}

impl Default for KvdbConfig {
    fn default() -> Self {
        Self {
            kind: String::new(),
            url: String::new(),
            db: String::new(),
            collection: String::new(),
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
            sync_mode: SyncMode::default(),
            backpressure: BackpressureConfig::default(),
        }
    }
}

impl KvdbConfig {
    /// Config for the in-memory backend
    pub fn memory() -> Self {
        Self {
            kind: "memory".to_string(),
            ..Default::default()
        }
    }

    /// Config for the journal backend stored under `dir`
    pub fn journal<S: Into<String>>(dir: S, db: S, collection: S) -> Self {
        Self {
            kind: "journal".to_string(),
            url: dir.into(),
            db: db.into(),
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// Set the slow-operation threshold
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold_ms = threshold.as_millis() as u64;
        self
    }

    /// Set the journal sync mode
    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    /// Set the backpressure thresholds
    pub fn with_backpressure(mut self, backpressure: BackpressureConfig) -> Self {
        self.backpressure = backpressure;
        self
    }

    /// Whether a backend is configured
    pub fn is_enabled(&self) -> bool {
        !self.kind.is_empty()
    }

    /// Slow-operation threshold as a `Duration`
    pub fn slow_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_threshold_ms)
    }
}
