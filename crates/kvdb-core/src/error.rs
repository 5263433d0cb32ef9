//! Error types for KVDB.

use std::fmt;

/// The main error type for KVDB operations.
#[derive(Debug)]
pub enum Error {
    /// The configured backend could not be opened
    Initialization(String),

    /// The service was opened without a backend
    Disabled,

    /// I/O error
    Io(std::io::Error),

    /// Serialization/deserialization error
    Serialization(String),

    /// Backend access failure on get or put
    Storage(String),

    /// A cursor step failed in the middle of a range scan
    Cursor(String),

    /// The worker thread could not be started
    WorkerUnavailable(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Initialization(msg) => write!(f, "Initialization error: {}", msg),
            Error::Disabled => write!(f, "KVDB is not enabled"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::Cursor(msg) => write!(f, "Cursor error: {}", msg),
            Error::WorkerUnavailable(msg) => write!(f, "Worker unavailable: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// A specialized `Result` type for KVDB operations.
pub type Result<T> = std::result::Result<T, Error>;
