//! Run output types: per-file outcomes and aggregate statistics.
//!
//! A run never returns `Err` just because files failed; callers inspect
//! [`RunOutput::files`] and [`RunStats`] to see partial success. The
//! invariant enforced by the orchestrator is that every discovered file
//! appears exactly once in [`RunOutput::files`], either converted (PDF
//! written and original relocated) or failed (error logged, original left
//! in place).

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Terminal outcome of one conversion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Source filename (no directory component).
    pub name: String,

    /// Path of the produced PDF.
    ///
    /// `None` for failed files, and also for successfully processed archives
    /// that held no qualifying images (those are relocated without output).
    pub pdf_path: Option<PathBuf>,

    /// Number of pages written to the PDF. 0 when no PDF was produced.
    pub pages: usize,

    /// The failure, if the job ended in the `Failed` state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,
}

impl FileOutcome {
    /// True when the job ended in the `Converted` terminal state.
    pub fn is_converted(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate statistics for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Archives discovered (and therefore dispatched).
    pub total_files: usize,
    /// Files that reached `Converted`, including empty archives.
    pub converted_files: usize,
    /// Files that reached `Failed` and were logged.
    pub failed_files: usize,
    /// Converted files that produced no PDF because the archive held no
    /// qualifying images.
    pub empty_archives: usize,
    /// Number of batches processed.
    pub total_batches: usize,
    /// Wall-clock duration of the whole run, pauses included.
    pub total_duration_ms: u64,
}

/// Complete result of [`crate::convert_dir`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// One entry per discovered file, in dispatch order.
    pub files: Vec<FileOutcome>,
    /// Aggregate counters.
    pub stats: RunStats,
}

impl RunOutput {
    /// Iterate over the outcomes that ended in `Failed`.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| !f.is_converted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_converted_states() {
        let ok = FileOutcome {
            name: "a.cbz".into(),
            pdf_path: Some(PathBuf::from("/x/a.pdf")),
            pages: 3,
            error: None,
        };
        assert!(ok.is_converted());

        let empty = FileOutcome {
            name: "b.cbz".into(),
            pdf_path: None,
            pages: 0,
            error: None,
        };
        assert!(empty.is_converted(), "empty archive is still a success");

        let failed = FileOutcome {
            name: "c.cbr".into(),
            pdf_path: None,
            pages: 0,
            error: Some(FileError::NotRar {
                path: "/x/c.cbr".into(),
            }),
        };
        assert!(!failed.is_converted());
    }

    #[test]
    fn output_serialises_to_json() {
        let out = RunOutput {
            files: vec![FileOutcome {
                name: "a.cbz".into(),
                pdf_path: Some(PathBuf::from("/x/a.pdf")),
                pages: 3,
                error: None,
            }],
            stats: RunStats {
                total_files: 1,
                converted_files: 1,
                failed_files: 0,
                empty_archives: 0,
                total_batches: 1,
                total_duration_ms: 17,
            },
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"total_files\":1"), "got: {json}");
        // error field omitted for successes
        assert!(!json.contains("\"error\""), "got: {json}");
    }
}
