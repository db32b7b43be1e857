//! Pipeline stages for CBZ/CBR-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. a different archive backend) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ archive ──▶ decode ──▶ encode ──▶ relocate
//! (dir scan)   (zip/rar)   (→ RGB)    (→ PDF)    (→ original/)
//! ```
//!
//! 1. [`discover`] — list the source directory and filter to `.cbz`/`.cbr`
//! 2. [`archive`]  — open the container, enumerate image entries in sorted
//!    order, and read their bytes; opening is the distinguished first stage
//!    of the per-file error model
//! 3. [`decode`]   — decode each entry to 8-bit RGB, dropping alpha and
//!    palette indirection
//! 4. [`encode`]   — embed the pages into a single PDF at the configured DPI
//! 5. [`relocate`] — move the processed source file into `original/`
//!
//! Stages 2–5 run inside `spawn_blocking` because the archive, image, and
//! PDF crates are all synchronous.

pub mod archive;
pub mod decode;
pub mod discover;
pub mod encode;
pub mod relocate;
