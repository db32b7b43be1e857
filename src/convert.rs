//! Batch conversion entry points.
//!
//! A run is a strict sequence of batches; within a batch, per-file jobs fan
//! out over a bounded worker pool (`buffer_unordered`) and fan back in
//! before the next batch starts. One job's failure never cancels its
//! siblings: every failure is converted to a [`FileOutcome`] at the file
//! boundary, appended to the error log, and the batch carries on. Only
//! discovery and setup failures are fatal.
//!
//! The per-file work (archive open, decode, encode, relocate) is entirely
//! synchronous, so each job runs inside `spawn_blocking` and the async layer
//! exists purely to bound concurrency and to sleep between batches.

use crate::config::ConversionConfig;
use crate::error::{Cb2PdfError, FileError};
use crate::faillog::ErrorLog;
use crate::output::{FileOutcome, RunOutput, RunStats};
use crate::pipeline::archive::{self, ArchiveError, OpenFailure};
use crate::pipeline::discover::{self, ArchiveFile};
use crate::pipeline::{decode, encode, relocate};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every `.cbz`/`.cbr` file in `path` to a PDF.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(RunOutput)` on success, even if some files failed
/// (check `output.stats.failed_files`).
///
/// # Errors
/// Returns `Err(Cb2PdfError)` only for fatal errors:
/// - The source directory cannot be listed
/// - The `original/` subdirectory cannot be created
pub async fn convert_dir(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<RunOutput, Cb2PdfError> {
    let start = Instant::now();
    let root = path.as_ref();
    info!("Starting conversion run in {}", root.display());

    // ── Step 1: Prepare the directory layout ─────────────────────────────
    let archive_dir = root.join("original");
    std::fs::create_dir_all(&archive_dir).map_err(|e| Cb2PdfError::ArchiveDirFailed {
        path: archive_dir.clone(),
        source: e,
    })?;
    let log = ErrorLog::new(root);

    // ── Step 2: Discover and partition ───────────────────────────────────
    let files = discover::discover(root)?;
    let total = files.len();
    let total_batches = discover::batch_count(total, config.batch_size);
    info!("Found {} archive(s), {} batch(es)", total, total_batches);

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total, total_batches);
    }

    // ── Step 3: Process batches in sequence ──────────────────────────────
    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(total);
    for (i, batch) in files.chunks(config.batch_size).enumerate() {
        let batch_num = i + 1;
        info!("Processing batch {}/{}", batch_num, total_batches);
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_start(batch_num, total_batches, batch.len());
        }

        let batch_outcomes = run_batch(batch, &archive_dir, &log, config).await;
        outcomes.extend(batch_outcomes);

        // Deterministic replacement for implicit inter-batch cleanup: the
        // hook runs once all jobs of this batch reached a terminal state.
        if let Some(ref hook) = config.release_hook {
            hook();
        }
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_complete(batch_num, total_batches);
        }

        if batch_num < total_batches {
            debug!("Pausing {:?} before next batch", config.batch_pause);
            tokio::time::sleep(config.batch_pause).await;
        }
    }

    // ── Step 4: Aggregate stats ──────────────────────────────────────────
    let converted = outcomes.iter().filter(|o| o.is_converted()).count();
    let failed = total - converted;
    let empty = outcomes
        .iter()
        .filter(|o| o.is_converted() && o.pdf_path.is_none())
        .count();

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, converted);
    }
    info!(
        "Run complete: {}/{} converted, {} failed, {}ms",
        converted,
        total,
        failed,
        start.elapsed().as_millis()
    );

    Ok(RunOutput {
        files: outcomes,
        stats: RunStats {
            total_files: total,
            converted_files: converted,
            failed_files: failed,
            empty_archives: empty,
            total_batches,
            total_duration_ms: start.elapsed().as_millis() as u64,
        },
    })
}

/// Synchronous wrapper around [`convert_dir`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_dir_sync(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<RunOutput, Cb2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Cb2PdfError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert_dir(path, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Fan a batch out over the worker pool and collect every terminal outcome.
///
/// Jobs complete in any order but outcomes come back in dispatch order.
/// Failures are absorbed into their outcome and logged here, at the file
/// boundary.
async fn run_batch(
    batch: &[ArchiveFile],
    archive_dir: &Path,
    log: &ErrorLog,
    config: &ConversionConfig,
) -> Vec<FileOutcome> {
    let mut indexed: Vec<(usize, FileOutcome)> =
        stream::iter(batch.iter().cloned().enumerate().map(|(idx, file)| {
        let archive_dir = archive_dir.to_path_buf();
        let dpi = config.dpi;
        let cb = config.progress_callback.clone();
        async move {
            if let Some(ref cb) = cb {
                cb.on_file_start(&file.name);
            }

            let job_file = file.clone();
            let joined =
                tokio::task::spawn_blocking(move || run_job(&job_file, &archive_dir, dpi)).await;
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(FileError::Process {
                    name: file.name.clone(),
                    detail: format!("conversion task failed: {e}"),
                }),
            };

            let outcome = match result {
                Ok(job) => {
                    debug!("Converted {} ({} pages)", file.name, job.pages);
                    if let Some(ref cb) = cb {
                        cb.on_file_complete(&file.name, job.pages);
                    }
                    FileOutcome {
                        name: file.name,
                        pdf_path: job.pdf_path,
                        pages: job.pages,
                        error: None,
                    }
                }
                Err(err) => {
                    let line = err.to_string();
                    if let Err(io_err) = log.append(&line) {
                        warn!(
                            "Could not append to {}: {}",
                            log.path().display(),
                            io_err
                        );
                    }
                    if let Some(ref cb) = cb {
                        cb.on_file_error(&file.name, &line);
                    }
                    FileOutcome {
                        name: file.name,
                        pdf_path: None,
                        pages: 0,
                        error: Some(err),
                    }
                }
            };
            (idx, outcome)
        }
    }))
    .buffer_unordered(config.workers)
    .collect()
    .await;

    // `buffer_unordered` yields in completion order; restore dispatch order.
    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, outcome)| outcome).collect()
}

struct JobOutput {
    pdf_path: Option<PathBuf>,
    pages: usize,
}

/// The per-file state machine: open → enumerate → decode → encode → relocate.
///
/// Runs on a blocking worker. An open failure maps to the format-specific
/// error; every later failure maps to the generic one. Reaching the end
/// means the PDF (if any pages existed) is on disk and the source file has
/// moved to `original/`.
fn run_job(file: &ArchiveFile, archive_dir: &Path, dpi: u32) -> Result<JobOutput, FileError> {
    let entries = archive::read_image_entries(file.kind, &file.path)
        .map_err(|e| archive_error_for(e, file))?;

    let mut pdf_path = None;
    let mut pages_written = 0;
    if !entries.is_empty() {
        let mut pages = Vec::with_capacity(entries.len());
        for entry in &entries {
            let img =
                decode::decode_entry(&entry.name, &entry.data).map_err(|e| FileError::Process {
                    name: file.name.clone(),
                    detail: format!("entry '{}': {e}", entry.name),
                })?;
            pages.push((entry.name.clone(), img));
        }
        drop(entries);

        let target = file.pdf_path();
        pages_written = encode::write_pdf(&file.name, &pages, &target, dpi).map_err(|detail| {
            FileError::Process {
                name: file.name.clone(),
                detail,
            }
        })?;
        pdf_path = Some(target);
        // `pages` drops here; decoded buffers are released whether or not
        // the encode above succeeded (early return drops them too).
    }

    relocate::relocate(&file.path, archive_dir, &file.name).map_err(|e| FileError::Process {
        name: file.name.clone(),
        detail: format!("failed to relocate into '{}': {e}", archive_dir.display()),
    })?;

    Ok(JobOutput {
        pdf_path,
        pages: pages_written,
    })
}

/// Map the two-stage archive error onto the per-file log templates.
fn archive_error_for(err: ArchiveError, file: &ArchiveFile) -> FileError {
    let path = file.path.display().to_string();
    match err {
        ArchiveError::Open(OpenFailure::Zip(detail)) => FileError::CbzOpen { path, detail },
        ArchiveError::Open(OpenFailure::NotRar) => FileError::NotRar { path },
        ArchiveError::Open(OpenFailure::Rar(detail)) => FileError::CbrOpen { path, detail },
        ArchiveError::Read(detail) => FileError::Process {
            name: file.name.clone(),
            detail,
        },
    }
}
