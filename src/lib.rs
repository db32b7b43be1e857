//! # cb2pdf
//!
//! Convert comic-book archives (CBZ/CBR) to multi-page PDFs in batches.
//!
//! ## Why this crate?
//!
//! Comic readers on tablets and e-ink devices handle PDF far more uniformly
//! than CBZ/CBR containers. This crate walks a directory of archives,
//! converts each one into a single PDF with pages in deterministic order,
//! and files the processed originals away — without letting one corrupt
//! archive spoil the run.
//!
//! ## Pipeline Overview
//!
//! ```text
//! directory
//!  │
//!  ├─ 1. Discover  list *.cbz / *.cbr (case-insensitive)
//!  ├─ 2. Batch     fixed-size slices, processed strictly in sequence
//!  ├─ 3. Convert   per file: open archive → decode pages → write PDF
//!  │               (bounded worker pool inside each batch, spawn_blocking)
//!  ├─ 4. Relocate  move processed source into original/
//!  └─ 5. Pause     sleep between batches to bound memory pressure
//! ```
//!
//! Per-file failures are appended to `error_log.txt` in the source
//! directory and never abort the batch. Every discovered file ends in
//! exactly one of two states: PDF produced and original relocated, or
//! failure logged and original left in place.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cb2pdf::{convert_dir, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default(); // batches of 5, 4 workers
//!     let output = convert_dir("/comics/inbox", &config).await?;
//!     println!(
//!         "{}/{} converted, {} failed",
//!         output.stats.converted_files,
//!         output.stats.total_files,
//!         output.stats.failed_files,
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cb2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! cb2pdf = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod faillog;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BatchReleaseHook, ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert_dir, convert_dir_sync};
pub use error::{Cb2PdfError, FileError};
pub use output::{FileOutcome, RunOutput, RunStats};
pub use pipeline::archive::ArchiveKind;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
