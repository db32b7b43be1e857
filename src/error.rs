//! Error types for the cb2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Cb2PdfError`] — **Fatal**: the run cannot proceed at all (source
//!   directory unreadable, archive subdirectory cannot be created, bad
//!   configuration). Returned as `Err(Cb2PdfError)` from the top-level
//!   `convert_dir*` functions.
//!
//! * [`FileError`] — **Non-fatal**: a single archive failed (corrupt
//!   container, undecodable page image, relocation error) but all other
//!   files in the batch are fine. Stored inside
//!   [`crate::output::FileOutcome`] and appended to `error_log.txt`, so one
//!   bad file never aborts the run.
//!
//! The [`FileError`] `Display` strings double as the log-line templates:
//! archive-open failures use a format-specific message, everything past a
//! successful open uses the generic `Failed to process …` message. The two
//! stages are composed explicitly in the per-file job rather than through
//! nested handlers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the cb2pdf library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::FileOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Cb2PdfError {
    /// The source directory could not be listed.
    #[error("Failed to read source directory '{path}': {source}")]
    DirReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The `original/` archive subdirectory could not be created.
    #[error("Failed to create archive subdirectory '{path}': {source}")]
    ArchiveDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single archive file.
///
/// The variant determines the log-line template. Open-stage failures carry
/// the full file path and a format-specific message; process-stage failures
/// (entry reads, decoding, PDF encoding, relocation) carry the bare filename
/// and the generic template.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum FileError {
    /// The `.cbz` file could not be opened as a zip container.
    #[error("Error processing CBZ {path}: {detail}")]
    CbzOpen { path: String, detail: String },

    /// The `.cbr` file does not carry a RAR signature at all.
    #[error("Not a valid RAR file: {path}")]
    NotRar { path: String },

    /// The `.cbr` file carries a RAR signature but could not be opened.
    #[error("Error processing CBR {path}: {detail}")]
    CbrOpen { path: String, detail: String },

    /// Any failure after the archive opened: enumeration, decoding,
    /// encoding, PDF write, or relocation.
    #[error("Failed to process {name}: {detail}")]
    Process { name: String, detail: String },
}

impl FileError {
    /// True when the failure happened while opening the container, i.e.
    /// before any page was touched.
    pub fn is_open_failure(&self) -> bool {
        !matches!(self, FileError::Process { .. })
    }
}
