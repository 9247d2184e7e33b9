//! Package archive extraction
//!
//! Packages arrive as ZIP archives. Only entries whose names end in one of the
//! configured extensions (case-insensitive) are written out; everything else in
//! the archive is skipped without being reported.

mod zip;


pub use zip::ZipEntries;

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Open a package archive for lazy extraction
///
/// Nothing is written until the returned iterator is advanced. Each call to
/// `next()` writes the next matching entry under `dest_path` (preserving the
/// entry's internal relative path) and yields the written path. The iterator is
/// single-pass; calling this again re-reads the archive from the start.
///
/// # Arguments
/// * `archive_path` - Path to the downloaded `.zip` package
/// * `dest_path` - Directory receiving the documents
/// * `extensions` - Entry suffixes to keep, with or without a leading dot (e.g. `["xml"]`)
///
/// # Example
/// ```no_run
/// use sat_dl::extraction::extract_archive;
/// use std::path::Path;
///
/// # fn example() -> sat_dl::Result<()> {
/// let extensions = vec!["xml".to_string()];
/// for document in extract_archive(Path::new("downloads/P1.zip"), Path::new("downloads"), &extensions)? {
///     println!("wrote {}", document?.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn extract_archive(
    archive_path: &Path,
    dest_path: &Path,
    extensions: &[String],
) -> Result<ZipEntries> {
    ZipEntries::open(archive_path, dest_path, extensions)
}

/// Extract every matching entry and return the written paths in archive order
pub fn extract_all(
    archive_path: &Path,
    dest_path: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let documents = extract_archive(archive_path, dest_path, extensions)?
        .collect::<Result<Vec<_>>>()?;

    info!(
        ?archive_path,
        extracted_count = documents.len(),
        "package extraction successful"
    );

    Ok(documents)
}

/// Check if an archive entry name ends with one of the extensions (case-insensitive)
///
/// Extensions may be given with or without the leading dot.
pub fn matches_extension(entry_name: &str, extensions: &[String]) -> bool {
    let name = entry_name.to_lowercase();
    extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .any(|ext| {
            name.strip_suffix(ext.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
        })
}
