//! Error types for snapshot loading and validation.
//!
//! The globe core itself never returns these across its boundary: bad entries
//! are logged and skipped. They exist for the loaders that feed it.

use std::fmt;
use std::path::PathBuf;

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or validating globe input data.
#[derive(Debug)]
pub enum Error {
    /// Reading a snapshot file failed.
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// JSON decoding failed.
    Json {
        /// Context for where the error occurred.
        context: &'static str,
        /// The underlying decode error.
        source: serde_json::Error,
    },
    /// A decoded entry failed validation.
    InvalidData {
        /// Context for where the error occurred.
        context: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            Error::Json { context, source } => {
                write!(f, "failed to decode {context}: {source}")
            }
            Error::InvalidData { context, detail } => {
                write!(f, "invalid {context}: {detail}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Json { source, .. } => Some(source),
            Error::InvalidData { .. } => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json {
            context: "json",
            source: e,
        }
    }
}

impl Error {
    /// Shorthand for an [`Error::InvalidData`].
    pub(crate) fn invalid(context: &'static str, detail: impl Into<String>) -> Self {
        Error::InvalidData {
            context,
            detail: detail.into(),
        }
    }
}
