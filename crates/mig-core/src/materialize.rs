//! Writing generated files to disk

use crate::error::WriteError;
use mig_model::GeneratedFileMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write one file atomically
///
/// Content goes to a temporary file in the target directory which is then
/// renamed over the target, so a reader never sees a torn file even when
/// two units write the same shared path.
///
/// # Errors
/// Returns [`WriteError`] naming the path that failed.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), WriteError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| WriteError::new(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| WriteError::new(path, e))?;
    tmp.write_all(content.as_bytes()).map_err(|e| WriteError::new(path, e))?;
    tmp.persist(path).map_err(|e| WriteError::new(path, e.error))?;
    Ok(())
}

/// Write every file of a map, stopping at the first failure
///
/// On failure the files this call created are removed again. Files that
/// already existed (scaffolding shared with another unit) are left in place.
///
/// # Errors
/// Returns the first [`WriteError`].
pub fn materialize(files: &GeneratedFileMap) -> Result<Vec<PathBuf>, WriteError> {
    let mut written = Vec::with_capacity(files.len());
    let mut created = Vec::new();
    for (path, file) in files {
        let fresh = !path.exists();
        if let Err(e) = write_atomic(path, &file.content) {
            roll_back(&created);
            return Err(e);
        }
        if fresh {
            created.push(path.clone());
        }
        written.push(path.clone());
    }
    tracing::debug!(files = written.len(), "materialized");
    Ok(written)
}

fn roll_back(created: &[PathBuf]) {
    for path in created {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "partial output not removed");
        }
    }
    tracing::debug!(files = created.len(), "partial output removed");
}
