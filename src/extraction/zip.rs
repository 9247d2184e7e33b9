use crate::error::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::matches_extension;

/// Lazy, single-pass extraction over the entries of a ZIP package
///
/// Yields one `Ok(path)` per written document. After an error the caller
/// should stop iterating; the archive is left as it was.
pub struct ZipEntries {
    archive: zip::ZipArchive<File>,
    archive_path: PathBuf,
    dest_path: PathBuf,
    extensions: Vec<String>,
    next_index: usize,
}

impl std::fmt::Debug for ZipEntries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipEntries")
            .field("archive_path", &self.archive_path)
            .field("dest_path", &self.dest_path)
            .field("entries", &self.archive.len())
            .field("next_index", &self.next_index)
            .finish()
    }
}

impl ZipEntries {
    /// Open the archive and read its central directory
    pub(crate) fn open(archive_path: &Path, dest_path: &Path, extensions: &[String]) -> Result<Self> {
        debug!(?archive_path, ?dest_path, "opening package archive");

        let file = File::open(archive_path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "failed to open package archive '{}': {}",
                    archive_path.display(),
                    e
                ),
            ))
        })?;

        let archive = zip::ZipArchive::new(file).map_err(|e| Error::InvalidArchive {
            archive: archive_path.to_path_buf(),
            reason: format!("failed to read ZIP archive: {}", e),
        })?;

        Ok(Self {
            archive,
            archive_path: archive_path.to_path_buf(),
            dest_path: dest_path.to_path_buf(),
            extensions: extensions.to_vec(),
            next_index: 0,
        })
    }

    /// Path of the archive being read
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Write entry `index` if it matches the filter; `Ok(None)` means skipped
    fn extract_entry(&mut self, index: usize) -> Result<Option<PathBuf>> {
        let mut entry = self
            .archive
            .by_index(index)
            .map_err(|e| Error::InvalidArchive {
                archive: self.archive_path.clone(),
                reason: format!("failed to read ZIP entry {}: {}", index, e),
            })?;

        if entry.is_dir() || !matches_extension(entry.name(), &self.extensions) {
            return Ok(None);
        }

        let file_path = match entry.enclosed_name() {
            Some(path) => self.dest_path.join(path),
            None => {
                warn!(
                    archive = ?self.archive_path,
                    entry = entry.name(),
                    "skipping entry with unsafe path"
                );
                return Ok(None);
            }
        };

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to create directory '{}': {}", parent.display(), e),
                ))
            })?;
        }

        let mut outfile = File::create(&file_path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to create '{}': {}", file_path.display(), e),
            ))
        })?;

        std::io::copy(&mut entry, &mut outfile).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                Error::InvalidArchive {
                    archive: self.archive_path.clone(),
                    reason: format!("corrupt entry '{}': {}", entry.name(), e),
                }
            } else {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to write '{}': {}", file_path.display(), e),
                ))
            }
        })?;

        debug!(?file_path, "extracted document");
        Ok(Some(file_path))
    }
}

impl Iterator for ZipEntries {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < self.archive.len() {
            let index = self.next_index;
            self.next_index += 1;

            match self.extract_entry(index) {
                Ok(Some(path)) => return Some(Ok(path)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
