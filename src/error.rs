use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by storage, import sources and the mailbox client.
///
/// Soft failures (HTTP non-success, empty bodies, unknown ids) are not
/// represented here; they surface as empty results or `false`.
#[derive(Debug, Error)]
pub enum Error {
    /// A local resource could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing store could not be opened, or a statement failed.
    #[error("Storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// The HTTP request never produced a response.
    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("Mailbox error: {0}")]
    Mailbox(String),

    /// Reading or writing delimited text failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

impl Error {
    pub fn storage(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Storage {
            operation,
            message: err.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
