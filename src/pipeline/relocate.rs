//! Relocation: move a processed source file into the archive subdirectory.
//!
//! Plain `rename` semantics, deliberately: an existing file of the same name
//! in `original/` is silently replaced (on Unix), and a cross-filesystem
//! move fails rather than falling back to copy-and-delete. Relocation
//! happens last, so a failure here leaves the source file in place and is
//! reported through the generic per-file error path.

use std::path::{Path, PathBuf};

/// Move `src` into `archive_dir`, keeping its filename. Returns the
/// destination path.
pub fn relocate(src: &Path, archive_dir: &Path, name: &str) -> std::io::Result<PathBuf> {
    let dest = archive_dir.join(name);
    std::fs::rename(src, &dest)?;
    Ok(dest)
}
