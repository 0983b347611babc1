//! Error types for namekeeper_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using namekeeper_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during keeper operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A file could not be opened or read while fingerprinting.
    #[error("Failed to fingerprint {path}: {source}")]
    Fingerprint {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The record file could not be read or created.
    #[error("Failed to load record file {path}: {source}")]
    LoadRecord {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The record file could not be written.
    #[error("Failed to save record file {path}: {source}")]
    SaveRecord {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A planned move could not be executed.
    #[error("Failed to rename {src} to {dst}: {source}")]
    Rename {
        src: PathBuf,
        dst: PathBuf,
        source: std::io::Error,
    },

    /// The target directory does not exist or is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid fingerprint format or encoding.
    #[error("Invalid fingerprint: {reason}")]
    InvalidFingerprint { reason: String },

    /// A record line could not be parsed.
    #[error("Malformed record: {reason}")]
    MalformedRecord { reason: String },

    /// A filename cannot be represented in the record format.
    #[error("Invalid filename {name:?}: {reason}")]
    InvalidFilename { name: String, reason: String },
}

impl Error {
    /// Create a Fingerprint error.
    pub fn fingerprint(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Fingerprint {
            path: path.into(),
            source,
        }
    }

    /// Create a LoadRecord error.
    pub fn load_record(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::LoadRecord {
            path: path.into(),
            source,
        }
    }

    /// Create a SaveRecord error.
    pub fn save_record(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::SaveRecord {
            path: path.into(),
            source,
        }
    }

    /// Create a Rename error.
    pub fn rename(
        src: impl Into<PathBuf>,
        dst: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Error::Rename {
            src: src.into(),
            dst: dst.into(),
            source,
        }
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Error::NotADirectory { path: path.into() }
    }

    /// Create an InvalidFingerprint error.
    pub fn invalid_fingerprint(reason: impl Into<String>) -> Self {
        Error::InvalidFingerprint {
            reason: reason.into(),
        }
    }

    /// Create a MalformedRecord error.
    pub fn malformed_record(reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            reason: reason.into(),
        }
    }

    /// Create an InvalidFilename error.
    pub fn invalid_filename(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidFilename {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

// Additional From implementations for external error types

impl From<ignore::Error> for Error {
    fn from(err: ignore::Error) -> Self {
        // ignore::Error can wrap an io::Error or be a path error
        match err.io_error() {
            Some(io_err) => Error::Io {
                source: std::io::Error::new(io_err.kind(), io_err.to_string()),
            },
            None => Error::Io {
                source: std::io::Error::other(err.to_string()),
            },
        }
    }
}
