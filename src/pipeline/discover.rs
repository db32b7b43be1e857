//! Discovery: find candidate archives in the source directory.
//!
//! The resulting sequence keeps the underlying listing order — it is not
//! sorted. Batch partitioning is a plain `chunks(batch_size)` over this
//! sequence, so batch membership is stable for a given listing.

use crate::error::Cb2PdfError;
use crate::pipeline::archive::ArchiveKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One candidate archive, immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    /// Filename without directory component.
    pub name: String,
    /// Absolute (or caller-relative) path to the file.
    pub path: PathBuf,
    /// Container format, derived from the extension.
    pub kind: ArchiveKind,
}

impl ArchiveFile {
    /// Output path: same directory, same base name, `.pdf` extension.
    pub fn pdf_path(&self) -> PathBuf {
        self.path.with_extension("pdf")
    }
}

/// List `root` and keep regular files whose name ends (case-insensitively)
/// in `.cbz` or `.cbr`.
///
/// A listing failure is fatal; per-entry metadata failures skip the entry.
pub fn discover(root: &Path) -> Result<Vec<ArchiveFile>, Cb2PdfError> {
    let entries = std::fs::read_dir(root).map_err(|e| Cb2PdfError::DirReadFailed {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Cb2PdfError::DirReadFailed {
            path: root.to_path_buf(),
            source: e,
        })?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(kind) = ArchiveKind::from_file_name(&name) {
            files.push(ArchiveFile {
                path: entry.path(),
                name,
                kind,
            });
        }
    }

    debug!("Discovered {} archive(s) in {}", files.len(), root.display());
    Ok(files)
}

/// Number of batches for `total` files at the given batch size.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size)
}
