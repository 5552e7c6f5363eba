//! Emit and dispatch errors

use crate::emitter::EmitterKind;
use std::path::PathBuf;

/// Errors raised by a code emitter
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmitError {
    /// Package is not a dotted sequence of identifiers
    #[error("invalid package name: '{0}'")]
    InvalidPackage(String),

    /// Emitter-specific failure
    #[error("emitter failed: {0}")]
    Failed(String),
}

/// Errors surfaced at the dispatch boundary
///
/// Every variant is a unit-level failure: the unit contributes no files and
/// the run carries on.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// An emitter returned an error
    #[error("{kind} emitter failed: {source}")]
    Emitter {
        kind: EmitterKind,
        #[source]
        source: EmitError,
    },

    /// Registry has no emitter for a required kind
    #[error("no emitter registered for {0}")]
    MissingEmitter(EmitterKind),

    /// An emitter produced a path outside the unit's output root
    #[error("generated path {path} escapes output root {root}")]
    PathEscapesRoot { path: PathBuf, root: PathBuf },
}

impl DispatchError {
    /// Create emitter error for kind
    pub fn emitter(kind: EmitterKind, source: EmitError) -> Self {
        Self::Emitter { kind, source }
    }
}
