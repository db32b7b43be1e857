//! The append-only failure log (`error_log.txt`).
//!
//! Failures are silent on the console; the log file is the only durable
//! record of what went wrong. Two properties matter here:
//!
//! * **Lazy creation** — the file appears on the first failure, so a fully
//!   successful run leaves no `error_log.txt` behind.
//! * **Atomic lines** — jobs within a batch fail concurrently; each entry is
//!   written as a single buffered `write_all` under a mutex so lines never
//!   interleave.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only, line-oriented failure log scoped to one source directory.
pub struct ErrorLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl ErrorLog {
    /// Create a handle for `error_log.txt` inside `dir`.
    ///
    /// Nothing is touched on disk until the first [`append`](Self::append).
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("error_log.txt"),
            file: Mutex::new(None),
        }
    }

    /// Location of the log file, whether or not it exists yet.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line to the log, opening (and creating) the file if this
    /// is the first failure of the run.
    pub fn append(&self, message: &str) -> std::io::Result<()> {
        let mut line = String::with_capacity(message.len() + 1);
        line.push_str(message);
        line.push('\n');

        let mut guard = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_none() {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(&self.path)?;
            *guard = Some(file);
        }
        // One write_all per entry keeps each line intact under concurrency.
        let file = guard.as_mut().unwrap();
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}
