//! Migration units
//!
//! A [`Unit`] is one source directory holding process definitions, schemas
//! and packaging resources. Units are immutable once discovered.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Recognised artifact kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// `.process` file
    ProcessDefinition,
    /// `.xsd` file
    Schema,
    /// `.bwp` legacy-runtime packaging
    Packaging,
}

impl ArtifactKind {
    /// Recognised extensions (without dot)
    pub const EXTENSIONS: [&'static str; 3] = ["process", "xsd", "bwp"];

    /// Classify a path by extension (case-insensitive)
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "process" => Some(Self::ProcessDefinition),
            "xsd" => Some(Self::Schema),
            "bwp" => Some(Self::Packaging),
            _ => None,
        }
    }
}

/// One artifact file inside a unit
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitArtifact {
    /// File path
    pub path: PathBuf,
    /// Artifact kind
    pub kind: ArtifactKind,
}

/// One discovered source directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    path: PathBuf,
    name: String,
    artifacts: Vec<UnitArtifact>,
}

impl Unit {
    /// Create a unit from explicit parts
    ///
    /// Artifacts are sorted by path so iteration order is stable.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, mut artifacts: Vec<UnitArtifact>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unit".to_string());
        artifacts.sort();
        Self { path, name, artifacts }
    }

    /// Scan a directory's immediate children for recognised artifacts
    ///
    /// Returns `Ok(None)` when the directory holds no recognised artifact.
    ///
    /// # Errors
    /// Returns the I/O error if the directory cannot be read.
    pub fn from_directory(dir: &Path) -> std::io::Result<Option<Self>> {
        let mut artifacts = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if let Some(kind) = ArtifactKind::from_path(&path) {
                artifacts.push(UnitArtifact { path, kind });
            }
        }
        if artifacts.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::new(dir, artifacts)))
    }

    /// Directory path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All artifacts, sorted by path
    #[inline]
    #[must_use]
    pub fn artifacts(&self) -> &[UnitArtifact] {
        &self.artifacts
    }

    /// Artifacts of one kind
    pub fn artifacts_of(&self, kind: ArtifactKind) -> impl Iterator<Item = &Path> {
        self.artifacts
            .iter()
            .filter(move |a| a.kind == kind)
            .map(|a| a.path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_kind_from_extension() {
        assert_eq!(ArtifactKind::from_path(Path::new("a/Loan.process")), Some(ArtifactKind::ProcessDefinition));
        assert_eq!(ArtifactKind::from_path(Path::new("Loan.XSD")), Some(ArtifactKind::Schema));
        assert_eq!(ArtifactKind::from_path(Path::new("app.bwp")), Some(ArtifactKind::Packaging));
        assert_eq!(ArtifactKind::from_path(Path::new("README.md")), None);
        assert_eq!(ArtifactKind::from_path(Path::new("process")), None);
    }

    #[test]
    fn from_directory_filters_unrecognised() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        assert!(Unit::from_directory(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join("Loan.xsd"), "<schema/>").unwrap();
        std::fs::create_dir(dir.path().join("nested.process")).unwrap();
        let unit = Unit::from_directory(dir.path()).unwrap().unwrap();
        assert_eq!(unit.artifacts().len(), 1);
        assert_eq!(unit.artifacts_of(ArtifactKind::Schema).count(), 1);
    }
}
