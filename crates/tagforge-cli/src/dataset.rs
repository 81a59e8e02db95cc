//! Directory datasets: images as records, tags in sidecar files.
//!
//! Every image in the dataset directory is one record. Its tags live in a
//! sibling file with the same stem and the sidecar extension (`a.png` →
//! `a.txt`). Keys are assigned in file-name order starting at 0, so they are
//! stable for as long as the directory listing is.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use tagforge_core::{dedupe, format_tags, parse_tags, Record, RecordKey};

use crate::config::DatasetConfig;

/// A loaded dataset directory.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
    sidecars: BTreeMap<RecordKey, PathBuf>,
}

impl Dataset {
    /// Scan `root` and read every record's sidecar.
    ///
    /// A missing sidecar means no tags. Repeated tags in a sidecar are
    /// collapsed. Subdirectories are not scanned.
    ///
    /// # Errors
    ///
    /// Fails when two images share a stem (`a.png`, `a.jpg`), since both
    /// would read and write the same sidecar.
    pub fn load(root: &Path, config: &DatasetConfig) -> Result<(Self, Vec<Record>)> {
        let images = list_images(root, config)?;

        let mut sidecars = BTreeMap::new();
        let mut owners: BTreeMap<PathBuf, String> = BTreeMap::new();
        let mut records = Vec::with_capacity(images.len());
        for (key, image) in (0u64..).zip(images) {
            let sidecar = image.with_extension(config.sidecar_extension());
            let name = image
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            if let Some(owner) = owners.insert(sidecar.clone(), name.clone()) {
                bail!(
                    "Images {} and {} share the sidecar {}; rename one of them",
                    owner,
                    name,
                    sidecar.display()
                );
            }
            let tags = read_sidecar(&sidecar)?;

            records.push(Record::new(
                key,
                name,
                image.to_string_lossy().into_owned(),
                tags,
            ));
            sidecars.insert(RecordKey(key), sidecar);
        }

        tracing::debug!("Loaded {} record(s) from {}", records.len(), root.display());
        Ok((
            Self {
                root: root.to_path_buf(),
                sidecars,
            },
            records,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sidecar path for a record.
    pub fn sidecar_path(&self, key: RecordKey) -> Option<&Path> {
        self.sidecars.get(&key).map(PathBuf::as_path)
    }

    /// Write the sidecar of every record whose tags differ from `baseline`.
    ///
    /// Both slices must come from the same load (same keys, same order).
    /// Returns the number of files written.
    pub fn save_changed(&self, baseline: &[Record], current: &[Record]) -> Result<usize> {
        let mut written = 0;
        for (before, after) in baseline.iter().zip(current) {
            debug_assert_eq!(before.key, after.key);
            if before.tags != after.tags {
                self.write_sidecar(after)?;
                written += 1;
            }
        }
        tracing::debug!("Wrote {} sidecar file(s)", written);
        Ok(written)
    }

    fn write_sidecar(&self, record: &Record) -> Result<()> {
        let path = self
            .sidecar_path(record.key)
            .with_context(|| format!("Record {} is not part of {}", record.key, self.root.display()))?;
        fs::write(path, format_tags(&record.tags))
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Image files directly inside `root`, sorted by file name.
pub fn list_images(root: &Path, config: &DatasetConfig) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root)
        .with_context(|| format!("Failed to read dataset directory {}", root.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", root.display()))?;
        let path = entry.path();
        if path.is_file() && config.is_image(&path) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

fn read_sidecar(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(dedupe(&parse_tags(&text))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}
