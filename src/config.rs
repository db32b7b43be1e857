//! Configuration types for batch conversion.
//!
//! All run behaviour is controlled through [`ConversionConfig`], built via
//! its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across runs and to diff two runs to understand
//! why their outputs differ. The source directory itself is a call argument
//! to [`crate::convert_dir`], not configuration: the same config is expected
//! to be reused across many directories.

use crate::error::Cb2PdfError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Hook invoked by the orchestrator after each batch's jobs have all
/// reached a terminal state, before the inter-batch pause.
///
/// Replaces the implicit runtime cleanup some converters rely on between
/// batches with an explicit, deterministic call site. Most callers leave it
/// unset; set it to flush caches or report memory high-water marks.
pub type BatchReleaseHook = Arc<dyn Fn() + Send + Sync>;

/// Configuration for a directory conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use cb2pdf::ConversionConfig;
/// use std::time::Duration;
///
/// let config = ConversionConfig::builder()
///     .batch_size(10)
///     .workers(8)
///     .batch_pause(Duration::from_secs(2))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Number of files per batch. Default: 5.
    ///
    /// Batches run strictly in sequence; the pause between them bounds the
    /// peak memory held by decoded page images. Smaller batches trade
    /// throughput for a tighter memory envelope.
    pub batch_size: usize,

    /// Number of concurrent per-file conversion jobs within a batch. Default: 4.
    ///
    /// Each job decodes every page of one archive into memory before the PDF
    /// is written, so the worst-case resident set is roughly
    /// `workers × largest-archive-size`. Raise this on machines with spare
    /// cores and RAM; lower it when converting very large archives.
    pub workers: usize,

    /// Pause between consecutive batches. Default: 10 seconds.
    ///
    /// Only the orchestrator sleeps; no pause follows the final batch.
    pub batch_pause: Duration,

    /// Resolution hint written into each output PDF, in DPI. Default: 300.
    ///
    /// Pixel data is embedded as-is; the DPI only fixes the physical page
    /// size a viewer reports. 300 matches print expectations for scanned
    /// comic pages.
    pub dpi: u32,

    /// Progress callback receiving run/batch/file events. Default: none.
    pub progress_callback: Option<ProgressCallback>,

    /// Per-batch resource-release hook. Default: none.
    pub release_hook: Option<BatchReleaseHook>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            workers: 4,
            batch_pause: Duration::from_secs(10),
            dpi: 300,
            progress_callback: None,
            release_hook: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("batch_size", &self.batch_size)
            .field("workers", &self.workers)
            .field("batch_pause", &self.batch_pause)
            .field("dpi", &self.dpi)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .field("release_hook", &self.release_hook.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn batch_size(mut self, n: usize) -> Self {
        self.config.batch_size = n.max(1);
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n.max(1);
        self
    }

    pub fn batch_pause(mut self, pause: Duration) -> Self {
        self.config.batch_pause = pause;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(36, 1200);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn release_hook(mut self, hook: BatchReleaseHook) -> Self {
        self.config.release_hook = Some(hook);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Cb2PdfError> {
        let c = &self.config;
        if c.batch_size == 0 {
            return Err(Cb2PdfError::InvalidConfig("Batch size must be ≥ 1".into()));
        }
        if c.workers == 0 {
            return Err(Cb2PdfError::InvalidConfig("Workers must be ≥ 1".into()));
        }
        if c.dpi == 0 {
            return Err(Cb2PdfError::InvalidConfig("DPI must be > 0".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ConversionConfig::default();
        assert_eq!(c.batch_size, 5);
        assert_eq!(c.workers, 4);
        assert_eq!(c.batch_pause, Duration::from_secs(10));
        assert_eq!(c.dpi, 300);
        assert!(c.progress_callback.is_none());
        assert!(c.release_hook.is_none());
    }

    #[test]
    fn builder_clamps_zero_counts() {
        let c = ConversionConfig::builder()
            .batch_size(0)
            .workers(0)
            .build()
            .unwrap();
        assert_eq!(c.batch_size, 1);
        assert_eq!(c.workers, 1);
    }

    #[test]
    fn builder_clamps_dpi_range() {
        let c = ConversionConfig::builder().dpi(10_000).build().unwrap();
        assert_eq!(c.dpi, 1200);
        let c = ConversionConfig::builder().dpi(1).build().unwrap();
        assert_eq!(c.dpi, 36);
    }

    #[test]
    fn debug_impl_elides_callbacks() {
        let c = ConversionConfig::default();
        let s = format!("{c:?}");
        assert!(s.contains("batch_size"), "got: {s}");
    }
}
