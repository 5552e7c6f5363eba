//! Generated file maps
//!
//! Provides [`GeneratedFileMap`], the output of every emitter: absolute
//! output path → literal content, each entry tagged with the grouping it
//! belongs to.

use crate::protocol::ProtocolTag;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Grouping tag assigned by the emitter that produced a file
///
/// Archive grouping is driven by these tags rather than by path segments,
/// so a generated class that happens to be named `rest` cannot be misrouted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileTag {
    /// Layered project for one protocol
    Protocol(ProtocolTag),
    /// Hexagonal domain, ports, output adapters and wiring
    HexagonalDomain,
    /// Hexagonal input adapter for one protocol
    HexagonalAdapter(ProtocolTag),
    /// Unit-level metadata not owned by any project
    Shared,
    /// API gateway project
    Gateway,
}

impl FileTag {
    /// Check if this file belongs to a hexagonal project
    #[inline]
    #[must_use]
    pub fn is_hexagonal(self) -> bool {
        matches!(self, Self::HexagonalDomain | Self::HexagonalAdapter(_))
    }
}

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Literal file content
    pub content: String,
    /// Grouping tag
    pub tag: FileTag,
}

/// Mapping from output path to generated file
///
/// Keys are unique within one map. Merging two maps is last-writer-wins,
/// which is how units that share scaffolding in a common output root
/// behave.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFileMap {
    files: BTreeMap<PathBuf, GeneratedFile>,
}

impl GeneratedFileMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>, tag: FileTag) {
        self.files.insert(
            path.into(),
            GeneratedFile {
                content: content.into(),
                tag,
            },
        );
    }

    /// Merge another map into this one (last writer wins)
    pub fn merge(&mut self, other: GeneratedFileMap) {
        self.files.extend(other.files);
    }

    /// Get file by path
    #[inline]
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&GeneratedFile> {
        self.files.get(path)
    }

    /// Check if a path is present
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Number of files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate in path order
    pub fn iter(&self) -> btree_map::Iter<'_, PathBuf, GeneratedFile> {
        self.files.iter()
    }

    /// Paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Subset carrying the given tag
    #[must_use]
    pub fn with_tag(&self, tag: FileTag) -> GeneratedFileMap {
        self.filter(|_, file| file.tag == tag)
    }

    /// Subset matching a predicate
    #[must_use]
    pub fn filter(&self, mut keep: impl FnMut(&Path, &GeneratedFile) -> bool) -> GeneratedFileMap {
        GeneratedFileMap {
            files: self
                .files
                .iter()
                .filter(|(path, file)| keep(path, file))
                .map(|(path, file)| (path.clone(), file.clone()))
                .collect(),
        }
    }

    /// Distinct tags present, sorted
    #[must_use]
    pub fn tags(&self) -> Vec<FileTag> {
        let mut tags: Vec<FileTag> = self.files.values().map(|f| f.tag).collect();
        tags.sort();
        tags.dedup();
        tags
    }

    /// Check that every key lies under `root`
    #[must_use]
    pub fn is_rooted_under(&self, root: &Path) -> bool {
        self.files.keys().all(|p| p.starts_with(root))
    }
}

impl IntoIterator for GeneratedFileMap {
    type Item = (PathBuf, GeneratedFile);
    type IntoIter = btree_map::IntoIter<PathBuf, GeneratedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a GeneratedFileMap {
    type Item = (&'a PathBuf, &'a GeneratedFile);
    type IntoIter = btree_map::Iter<'a, PathBuf, GeneratedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl FromIterator<(PathBuf, GeneratedFile)> for GeneratedFileMap {
    fn from_iter<I: IntoIterator<Item = (PathBuf, GeneratedFile)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REST: FileTag = FileTag::Protocol(ProtocolTag::Rest);

    #[test]
    fn merge_is_last_writer_wins() {
        let mut a = GeneratedFileMap::new();
        a.insert("/out/rest/application.yml", "port: 8080", REST);
        let mut b = GeneratedFileMap::new();
        b.insert("/out/rest/application.yml", "port: 9090", REST);
        b.insert("/out/rest/pom.xml", "<project/>", REST);

        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get(Path::new("/out/rest/application.yml")).unwrap().content, "port: 9090");
    }

    #[test]
    fn tag_filtering() {
        let mut files = GeneratedFileMap::new();
        files.insert("/out/rest/pom.xml", "", REST);
        files.insert("/out/soap/pom.xml", "", FileTag::Protocol(ProtocolTag::Soap));
        files.insert("/out/traceability/u.json", "{}", FileTag::Shared);

        assert_eq!(files.with_tag(REST).len(), 1);
        assert_eq!(files.tags().len(), 3);
        assert!(files.is_rooted_under(Path::new("/out")));
        assert!(!files.is_rooted_under(Path::new("/out/rest")));
    }
}
