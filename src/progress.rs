//! Progress-callback trait for run, batch, and file events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! real-time events as the orchestrator works through each batch.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a log sink, or a GUI without
//! the library knowing anything about how the host application communicates.
//! The trait is `Send + Sync` so it works correctly when files inside a
//! batch complete concurrently and out of order.

use std::sync::Arc;

/// Called by the orchestrator as it processes batches and files.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// `on_file_start`, `on_file_complete`, and `on_file_error` may be called
/// concurrently from different worker slots within a batch. Implementations
/// must protect shared mutable state with appropriate synchronisation
/// primitives (e.g. `Mutex`, `AtomicUsize`). Run- and batch-level events are
/// always delivered from the orchestrating task, in order.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after discovery, before the first batch starts.
    ///
    /// # Arguments
    /// * `total_files`   — number of archives that will be processed
    /// * `total_batches` — ceil(total_files / batch_size)
    fn on_run_start(&self, total_files: usize, total_batches: usize) {
        let _ = (total_files, total_batches);
    }

    /// Called when a batch is dispatched to the worker pool.
    ///
    /// # Arguments
    /// * `batch`         — 1-indexed batch number
    /// * `total_batches` — total batch count for the run
    /// * `files`         — number of files in this batch (the last batch may
    ///   be smaller than the configured batch size)
    fn on_batch_start(&self, batch: usize, total_batches: usize, files: usize) {
        let _ = (batch, total_batches, files);
    }

    /// Called just before a file's conversion job is handed to a worker.
    fn on_file_start(&self, name: &str) {
        let _ = name;
    }

    /// Called when a file reaches the `Converted` terminal state.
    ///
    /// # Arguments
    /// * `name`  — source filename
    /// * `pages` — pages written to the PDF; 0 means the archive held no
    ///   qualifying images and no PDF was produced (still a success)
    fn on_file_complete(&self, name: &str, pages: usize) {
        let _ = (name, pages);
    }

    /// Called when a file reaches the `Failed` terminal state.
    ///
    /// The same message has already been appended to the error log; this
    /// event exists for live display only.
    fn on_file_error(&self, name: &str, error: &str) {
        let _ = (name, error);
    }

    /// Called after every job in a batch has reached a terminal state and
    /// the release hook (if any) has run, before the inter-batch pause.
    fn on_batch_complete(&self, batch: usize, total_batches: usize) {
        let _ = (batch, total_batches);
    }

    /// Called once after the final batch completes.
    ///
    /// # Arguments
    /// * `total_files` — archives processed in this run
    /// * `converted`   — files that reached `Converted` (including empty
    ///   archives that produced no PDF)
    fn on_run_complete(&self, total_files: usize, converted: usize) {
        let _ = (total_files, converted);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
