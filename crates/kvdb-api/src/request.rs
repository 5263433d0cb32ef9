//! Queued operations and their completion callbacks.

use kvdb_core::{Item, Result};

/// Completion callback for [`Request::Get`]; `Ok(None)` means the key is absent
pub type GetCallback = Box<dyn FnOnce(Result<Option<String>>) + Send + 'static>;

/// Completion callback for [`Request::Put`]
pub type PutCallback = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// Completion callback for [`Request::GetRange`]
pub type GetRangeCallback = Box<dyn FnOnce(Result<Vec<Item>>) + Send + 'static>;

/// One pending storage operation.
///
/// Callbacks are optional: a fire-and-forget put still runs, its outcome is
/// simply dropped.
pub enum Request {
    /// Point lookup
    Get {
        /// Key to read
        key: String,
        /// Result delivery
        on_done: Option<GetCallback>,
    },
    /// Upsert
    Put {
        /// Key to write
        key: String,
        /// Value to store
        value: String,
        /// Result delivery
        on_done: Option<PutCallback>,
    },
    /// Range scan over `[begin_key, end_key)`
    GetRange {
        /// First key included
        begin_key: String,
        /// First key excluded
        end_key: String,
        /// Result delivery
        on_done: Option<GetRangeCallback>,
    },
}

impl Request {
    /// Name reported to the operation monitor
    pub fn op_name(&self) -> &'static str {
        match self {
            Request::Get { .. } => "kvdb.get",
            Request::Put { .. } => "kvdb.put",
            Request::GetRange { .. } => "kvdb.getRange",
        }
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Get { key, .. } => f.debug_struct("Get").field("key", key).finish(),
            Request::Put { key, value, .. } => f
                .debug_struct("Put")
                .field("key", key)
                .field("value_len", &value.len())
                .finish(),
            Request::GetRange {
                begin_key, end_key, ..
            } => f
                .debug_struct("GetRange")
                .field("begin_key", begin_key)
                .field("end_key", end_key)
                .finish(),
        }
    }
}
