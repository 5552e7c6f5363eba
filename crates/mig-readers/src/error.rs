//! Reader error types

use std::path::PathBuf;

/// Errors while reading a process or schema artifact
///
/// Callers treat every variant as recoverable: the artifact is skipped and
/// the unit keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML
    #[error("syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    /// Document has no root element
    #[error("no root element in {0}")]
    MissingRoot(PathBuf),

    /// Root element is not the one this reader expects
    #[error("unexpected root element '{found}' in {path} (expected '{expected}')")]
    UnexpectedRoot {
        path: PathBuf,
        expected: &'static str,
        found: String,
    },
}

impl ParseError {
    /// Create syntax error for path
    pub fn syntax(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParseError::syntax("Loan.process", "unexpected EOF");
        assert_eq!(err.to_string(), "syntax error in Loan.process: unexpected EOF");

        let err = ParseError::MissingRoot(PathBuf::from("empty.xsd"));
        assert_eq!(err.to_string(), "no root element in empty.xsd");
    }
}
