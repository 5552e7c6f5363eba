//! Artifact readers
//!
//! Turns unit artifacts into model types:
//! - Process definitions (`.process`) into `ProcessDefinition`
//! - Schemas (`.xsd`) into ordered `SchemaEntity` lists

use crate::error::ParseError;
use mig_model::ArtifactKind;
use std::path::Path;

mod process;
mod schema;

pub use process::ProcessReader;
pub use schema::SchemaReader;

/// Reader trait for converting artifact content into model values
pub trait ArtifactReader: Send + Sync + 'static {
    /// Value this reader produces
    type Output;

    /// Artifact kind this reader handles
    fn kind(&self) -> ArtifactKind;

    /// Parse content; `path` is used for error messages and name fallbacks
    fn parse(&self, content: &str, path: &Path) -> Result<Self::Output, ParseError>;

    /// Check if this reader can handle the given path
    fn can_read(&self, path: &Path) -> bool {
        ArtifactKind::from_path(path) == Some(self.kind())
    }

    /// Read and parse a file
    fn read(&self, path: &Path) -> Result<Self::Output, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
        self.parse(&content, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_match_their_extensions() {
        assert!(ProcessReader.can_read(Path::new("/units/loan/Loan.process")));
        assert!(!ProcessReader.can_read(Path::new("Loan.xsd")));
        assert!(SchemaReader.can_read(Path::new("Loan.XSD")));
        assert!(!SchemaReader.can_read(Path::new("app.bwp")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ProcessReader.read(Path::new("/definitely/not/here.process")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
