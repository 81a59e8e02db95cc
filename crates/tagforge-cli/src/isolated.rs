//! Isolated sidecars: tag files left behind after their image was removed.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::DatasetConfig;

/// Sidecar files in `root` with no image of the same stem, sorted by name.
pub fn find_isolated(root: &Path, config: &DatasetConfig) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root)
        .with_context(|| format!("Failed to read dataset directory {}", root.display()))?;

    let mut image_stems: HashSet<OsString> = HashSet::new();
    let mut sidecars = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list {}", root.display()))?
            .path();
        if !path.is_file() {
            continue;
        }
        if config.is_image(&path) {
            if let Some(stem) = path.file_stem() {
                image_stems.insert(stem.to_os_string());
            }
        } else if config.is_sidecar(&path) {
            sidecars.push(path);
        }
    }

    let mut isolated: Vec<PathBuf> = sidecars
        .into_iter()
        .filter(|path| {
            path.file_stem()
                .is_none_or(|stem| !image_stems.contains(stem))
        })
        .collect();
    isolated.sort();

    tracing::debug!(
        "Found {} isolated sidecar(s) in {}",
        isolated.len(),
        root.display()
    );
    Ok(isolated)
}

/// Delete the given files. Stops at the first failure.
pub fn delete_isolated(paths: &[PathBuf]) -> Result<usize> {
    for path in paths {
        fs::remove_file(path).with_context(|| format!("Failed to delete {}", path.display()))?;
        tracing::debug!("Deleted {}", path.display());
    }
    Ok(paths.len())
}
