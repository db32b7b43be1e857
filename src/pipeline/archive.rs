//! Archive reading: open a CBZ/CBR container and pull out its page images.
//!
//! The error model distinguishes the *open* stage from everything after it.
//! An open failure means the file is not a usable instance of its claimed
//! format and is reported with a format-specific message; failures while
//! enumerating or reading entries use the generic per-file message. The two
//! stages surface as the two variants of [`ArchiveError`], composed
//! explicitly by the caller rather than through nested handlers.
//!
//! Entry filtering is deliberately a loose suffix match (`jpg`, `jpeg`,
//! `png`, case-insensitive) rather than a true extension check, so a name
//! ending in `ajpg` also qualifies. Matched entries are sorted
//! lexicographically by name to fix page order deterministically.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;
use unrar::error::Code;
use unrar::Archive;

/// Container format, derived from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveKind {
    /// Zip-based comic archive (`.cbz`).
    Cbz,
    /// Rar-based comic archive (`.cbr`).
    Cbr,
}

impl ArchiveKind {
    /// Classify a filename by its (case-insensitive) extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".cbz") {
            Some(ArchiveKind::Cbz)
        } else if lower.ends_with(".cbr") {
            Some(ArchiveKind::Cbr)
        } else {
            None
        }
    }
}

/// One image entry read out of an archive.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    /// In-archive entry name.
    pub name: String,
    /// Raw (still encoded) image bytes.
    pub data: Vec<u8>,
}

/// Why the container could not be opened.
#[derive(Debug)]
pub enum OpenFailure {
    /// The `.cbz` could not be opened as a zip stream.
    Zip(String),
    /// The `.cbr` carries no RAR signature.
    NotRar,
    /// The `.cbr` has a RAR signature but could not be opened.
    Rar(String),
}

/// Two-stage archive error: open vs. everything after.
#[derive(Debug)]
pub enum ArchiveError {
    /// The container never opened.
    Open(OpenFailure),
    /// The container opened, but enumerating or reading an entry failed.
    Read(String),
}

/// Loose suffix match used to select page images.
pub fn is_image_entry(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with("jpg") || lower.ends_with("jpeg") || lower.ends_with("png")
}

/// Open the archive at `path` and return its qualifying image entries,
/// sorted lexicographically by name.
pub fn read_image_entries(kind: ArchiveKind, path: &Path) -> Result<Vec<ImageEntry>, ArchiveError> {
    let entries = match kind {
        ArchiveKind::Cbz => read_zip(path)?,
        ArchiveKind::Cbr => read_rar(path)?,
    };
    debug!(
        "{}: {} qualifying image entr{}",
        path.display(),
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" }
    );
    Ok(entries)
}

fn read_zip(path: &Path) -> Result<Vec<ImageEntry>, ArchiveError> {
    let file = std::fs::File::open(path)
        .map_err(|e| ArchiveError::Open(OpenFailure::Zip(e.to_string())))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ArchiveError::Open(OpenFailure::Zip(e.to_string())))?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| is_image_entry(n))
        .map(str::to_owned)
        .collect();
    names.sort();

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let mut entry = archive
            .by_name(&name)
            .map_err(|e| ArchiveError::Read(format!("entry '{name}': {e}")))?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| ArchiveError::Read(format!("entry '{name}': {e}")))?;
        entries.push(ImageEntry { name, data });
    }
    Ok(entries)
}

fn read_rar(path: &Path) -> Result<Vec<ImageEntry>, ArchiveError> {
    let mut archive = Archive::new(path)
        .open_for_processing()
        .map_err(|e| match e.code {
            Code::BadArchive => ArchiveError::Open(OpenFailure::NotRar),
            _ => ArchiveError::Open(OpenFailure::Rar(e.to_string())),
        })?;

    // The unrar cursor walks entries in archive order; collect matches and
    // sort afterwards to get the same deterministic page order as zip.
    let mut entries = Vec::new();
    loop {
        let header = match archive.read_header() {
            Ok(Some(header)) => header,
            Ok(None) => break,
            Err(e) => return Err(ArchiveError::Read(e.to_string())),
        };
        let name = header.entry().filename.to_string_lossy().into_owned();
        archive = if header.entry().is_file() && is_image_entry(&name) {
            let (data, rest) = header
                .read()
                .map_err(|e| ArchiveError::Read(format!("entry '{name}': {e}")))?;
            entries.push(ImageEntry { name, data });
            rest
        } else {
            header
                .skip()
                .map_err(|e| ArchiveError::Read(e.to_string()))?
        };
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
