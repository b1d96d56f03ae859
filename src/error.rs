//! Error taxonomy for a generation run.
//!
//! Every failure that aborts a run is reported as one [`GenerateError`] with a
//! human-readable message. Malformed data inside individual operations is never
//! an error; it degrades to permissive defaults in the generator.

use std::fmt;
use std::path::{Path, PathBuf};

/// A fatal generation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The document could not be read from disk or fetched over the network
    DocumentUnavailable {
        /// File path or URL that was requested
        source: String,
        /// Underlying I/O or HTTP failure
        reason: String,
    },
    /// Document retrieval did not complete within the configured timeout
    RetrievalTimeout {
        /// File path or URL that was requested
        source: String,
        /// Timeout that elapsed, in seconds
        seconds: u64,
    },
    /// The payload is not a JSON/YAML object
    DocumentMalformed {
        /// Parser message or shape description
        reason: String,
    },
    /// The output directory could not be created or purged
    OutputDirectory {
        /// Directory being prepared
        path: PathBuf,
        /// Underlying I/O failure
        reason: String,
    },
    /// A generated or custom file could not be persisted
    Write {
        /// File being written
        path: PathBuf,
        /// Underlying I/O failure
        reason: String,
    },
    /// A file template failed to render
    Render {
        /// Template engine message
        reason: String,
    },
}

impl GenerateError {
    pub(crate) fn unavailable(source: &str, reason: impl fmt::Display) -> Self {
        GenerateError::DocumentUnavailable {
            source: source.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        GenerateError::DocumentMalformed {
            reason: reason.into(),
        }
    }

    pub(crate) fn output_dir(path: &Path, reason: impl fmt::Display) -> Self {
        GenerateError::OutputDirectory {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, reason: impl fmt::Display) -> Self {
        GenerateError::Write {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::DocumentUnavailable { source, reason } => {
                write!(f, "Failed to retrieve API document from '{source}': {reason}")
            }
            GenerateError::RetrievalTimeout { source, seconds } => {
                write!(
                    f,
                    "Timed out after {seconds}s while retrieving API document from '{source}'"
                )
            }
            GenerateError::DocumentMalformed { reason } => {
                write!(f, "API document is malformed: {reason}")
            }
            GenerateError::OutputDirectory { path, reason } => {
                write!(
                    f,
                    "Failed to prepare output directory {}: {reason}",
                    path.display()
                )
            }
            GenerateError::Write { path, reason } => {
                write!(f, "Failed to write {}: {reason}", path.display())
            }
            GenerateError::Render { reason } => {
                write!(f, "Failed to render file template: {reason}")
            }
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<askama::Error> for GenerateError {
    fn from(err: askama::Error) -> Self {
        GenerateError::Render {
            reason: err.to_string(),
        }
    }
}
