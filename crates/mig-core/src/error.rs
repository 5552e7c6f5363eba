//! Error types for the migration core
//!
//! Only [`MigrationError`] aborts a run. Everything else is demoted to a
//! per-unit outcome, a dropped archive or a failed validation result.

use crate::phase::RunPhase;
use std::path::PathBuf;

/// Fatal run errors
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Input root does not exist
    #[error("input root not found: {0}")]
    InputRootMissing(PathBuf),

    /// Input root exists but is not a directory
    #[error("input root is not a directory: {0}")]
    InputRootNotDirectory(PathBuf),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O on the input or output root failed
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Phase machine misuse
    #[error("invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: RunPhase, to: RunPhase },
}

impl MigrationError {
    /// Create I/O error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Worker count must be positive
    #[error("max_workers must be at least 1")]
    ZeroWorkers,

    /// Package is empty or not a dotted identifier
    #[error("invalid package name: '{0}'")]
    InvalidPackage(String),

    /// Build timeout must be positive
    #[error("build_timeout_secs must be at least 1")]
    ZeroTimeout,

    /// Config file unreadable
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file malformed
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Archive errors
///
/// Per-entry problems never surface here: they demote the entry's name.
/// These errors drop the whole archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Destination could not be created or written
    #[error("cannot write archive {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Zip encoder failed
    #[error("zip error on {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Zip {
            path: path.into(),
            source,
        }
    }
}

/// A generated file could not be written
#[derive(Debug, thiserror::Error)]
#[error("cannot write {path}: {source}")]
pub struct WriteError {
    /// Path that could not be written
    pub path: PathBuf,
    /// Underlying I/O error
    #[source]
    pub source: std::io::Error,
}

impl WriteError {
    pub(crate) fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Worker pool errors
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// A job panicked or was cancelled
    #[error("worker for '{job}' did not finish: {message}")]
    WorkerLost { job: String, message: String },

    /// The pool's semaphore was closed
    #[error("worker pool is shut down")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_error_display() {
        let err = MigrationError::InputRootMissing(PathBuf::from("/nowhere"));
        assert_eq!(err.to_string(), "input root not found: /nowhere");

        let err = MigrationError::from(ConfigError::ZeroWorkers);
        assert_eq!(err.to_string(), "configuration error: max_workers must be at least 1");
    }

    #[test]
    fn transition_error_names_phases() {
        let err = MigrationError::InvalidTransition {
            from: RunPhase::Packaging,
            to: RunPhase::Indexing,
        };
        assert_eq!(err.to_string(), "invalid phase transition: packaging -> indexing");
    }
}
