//! Archive packaging
//!
//! [`ArchiveManifest`] groups generated files destined for one zip archive;
//! [`ArchiveBuilder`] writes it. Grouping is driven by each file's
//! [`FileTag`], never by path segments.

use crate::error::ArchiveError;
use mig_model::{Architecture, FileTag, GeneratedFileMap, ProtocolTag, ServiceType};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive name for the gateway project
pub const GATEWAY_ARCHIVE: &str = "api-gateway.zip";

/// Files destined for one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveManifest {
    file_name: String,
    root: PathBuf,
    entries: GeneratedFileMap,
}

impl ArchiveManifest {
    /// Create manifest; in-archive names are taken relative to `root`
    #[must_use]
    pub fn new(file_name: impl Into<String>, root: impl Into<PathBuf>, entries: GeneratedFileMap) -> Self {
        Self {
            file_name: file_name.into(),
            root: root.into(),
            entries,
        }
    }

    /// Archive file name
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Base for in-archive names
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files to archive
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &GeneratedFileMap {
        &self.entries
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there is nothing to archive
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// In-archive name of a path under the root, `/`-separated
    ///
    /// `None` when the path lies outside the root or escapes it.
    #[must_use]
    pub fn entry_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        (!parts.is_empty()).then(|| parts.join("/"))
    }

    /// Per-unit manifests
    ///
    /// Layered output yields one `<unit>_<protocol>.zip` per protocol that
    /// produced files. Hexagonal output yields exactly one
    /// `<unit>_hexagonal_<service-type>.zip` holding everything the unit
    /// generated.
    #[must_use]
    pub fn for_unit(
        unit_name: &str,
        files: &GeneratedFileMap,
        architecture: Architecture,
        service_type: ServiceType,
        root: &Path,
    ) -> Vec<Self> {
        let stem = archive_stem(unit_name);
        match architecture {
            Architecture::Layered => ProtocolTag::ALL
                .iter()
                .map(|p| {
                    Self::new(
                        format!("{stem}_{p}.zip"),
                        root,
                        files.with_tag(FileTag::Protocol(*p)),
                    )
                })
                .filter(|m| !m.is_empty())
                .collect(),
            Architecture::Hexagonal => {
                if files.is_empty() {
                    Vec::new()
                } else {
                    vec![Self::new(format!("{stem}_hexagonal_{service_type}.zip"), root, files.clone())]
                }
            }
        }
    }

    /// Run-wide source archives over every unit's `src` trees
    #[must_use]
    pub fn source_aggregates(
        files: &GeneratedFileMap,
        architecture: Architecture,
        service_type: ServiceType,
        root: &Path,
    ) -> Vec<Self> {
        let in_src = |path: &Path| {
            path.strip_prefix(root)
                .is_ok_and(|rel| rel.components().any(|c| c.as_os_str() == "src"))
        };
        let manifests = match architecture {
            Architecture::Layered => ProtocolTag::ALL
                .iter()
                .map(|p| {
                    let tag = FileTag::Protocol(*p);
                    Self::new(format!("src_{p}.zip"), root, files.filter(|path, f| f.tag == tag && in_src(path)))
                })
                .collect(),
            Architecture::Hexagonal => vec![Self::new(
                format!("src_hexagonal_{service_type}.zip"),
                root,
                files.filter(|path, f| f.tag.is_hexagonal() && in_src(path)),
            )],
        };
        manifests.into_iter().filter(|m| !m.is_empty()).collect()
    }

    /// Gateway project manifest
    #[must_use]
    pub fn gateway(files: &GeneratedFileMap, root: &Path) -> Option<Self> {
        let entries = files.with_tag(FileTag::Gateway);
        (!entries.is_empty()).then(|| Self::new(GATEWAY_ARCHIVE, root, entries))
    }
}

/// Distinct archive stems for a run's units
///
/// Takes `(directory name, unit name)` pairs in discovery order and returns
/// one stem per pair. A unit name shared by several units is qualified with
/// the directory name as `<directory>_<name>`; anything still taken gets a
/// numeric suffix. Directory names are unique under one input root, so the
/// result never repeats.
#[must_use]
pub fn unit_stems<'a>(units: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<String> {
    let units: Vec<(String, String)> = units
        .into_iter()
        .map(|(dir, name)| (archive_stem(dir), archive_stem(name)))
        .collect();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (_, name) in &units {
        *seen.entry(name.as_str()).or_default() += 1;
    }

    let mut taken = HashSet::new();
    units
        .iter()
        .map(|(dir, name)| {
            let base = if seen[name.as_str()] > 1 && dir != name {
                format!("{dir}_{name}")
            } else {
                name.clone()
            };
            let mut stem = base.clone();
            let mut n = 2;
            while !taken.insert(stem.clone()) {
                stem = format!("{base}_{n}");
                n += 1;
            }
            stem
        })
        .collect()
}

/// File-name-safe form of a unit name
fn archive_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    if stem.trim_matches('.').is_empty() {
        "unit".to_string()
    } else {
        stem
    }
}

/// Writes manifests as deflated zip archives
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    destination: PathBuf,
}

impl ArchiveBuilder {
    /// Create builder writing archives into `destination`
    #[must_use]
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    /// Archive directory
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Write one archive, replacing any previous one of the same name
    ///
    /// The archive is assembled in a temporary file next to the target and
    /// renamed into place, so readers never see a partial archive.
    ///
    /// An entry outside the manifest root is stored under its base name; an
    /// entry that still cannot be written is skipped. Neither fails the
    /// archive.
    ///
    /// # Errors
    /// Returns [`ArchiveError`] if the archive file cannot be created or
    /// finalised.
    pub fn build(&self, manifest: &ArchiveManifest) -> Result<PathBuf, ArchiveError> {
        std::fs::create_dir_all(&self.destination).map_err(|e| ArchiveError::io(&self.destination, e))?;
        let path = self.destination.join(manifest.file_name());
        let tmp = tempfile::NamedTempFile::new_in(&self.destination).map_err(|e| ArchiveError::io(&path, e))?;

        let mut zip = ZipWriter::new(tmp);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut written = BTreeSet::new();

        for (entry_path, entry) in manifest.entries() {
            let name = match manifest.entry_name(entry_path) {
                Some(name) => name,
                None => {
                    let Some(base) = entry_path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                        tracing::warn!(archive = %path.display(), entry = %entry_path.display(), "entry has no name; skipped");
                        continue;
                    };
                    tracing::warn!(
                        archive = %path.display(),
                        entry = %entry_path.display(),
                        "entry outside archive root; stored by base name"
                    );
                    base
                }
            };
            if !written.insert(name.clone()) {
                tracing::warn!(archive = %path.display(), name = %name, "duplicate entry name; skipped");
                continue;
            }
            if let Err(e) = zip.start_file(name.as_str(), options) {
                tracing::warn!(archive = %path.display(), name = %name, error = %e, "entry skipped");
                continue;
            }
            if let Err(e) = zip.write_all(entry.content.as_bytes()) {
                tracing::warn!(archive = %path.display(), name = %name, error = %e, "entry write failed");
            }
        }

        let tmp = zip.finish().map_err(|e| ArchiveError::zip(&path, e))?;
        tmp.persist(&path).map_err(|e| ArchiveError::io(&path, e.error))?;
        tracing::info!(archive = %path.display(), entries = written.len(), "archive written");
        Ok(path)
    }
}
