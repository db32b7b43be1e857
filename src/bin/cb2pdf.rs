//! CLI binary for cb2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints a run summary.

use anyhow::{Context, Result};
use cb2pdf::{
    convert_dir, ConversionConfig, ConversionProgressCallback, ProgressCallback,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a run-wide progress bar plus per-batch log
/// lines. Designed to work correctly when files inside a batch complete
/// out of order.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of files that failed.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set by
    /// `on_run_start` (called after discovery, before any batch runs).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Listing archives…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_files: usize, total_batches: usize) {
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Converting {total_files} archive(s) in {total_batches} batch(es)…"
            ))
        ));
    }

    fn on_batch_start(&self, batch: usize, total_batches: usize, files: usize) {
        self.bar.println(format!(
            "{} Batch {batch}/{total_batches}  {}",
            cyan("▸"),
            dim(&format!("{files} file(s)"))
        ));
    }

    fn on_file_start(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_file_complete(&self, name: &str, pages: usize) {
        let detail = if pages == 0 {
            dim("no images, relocated")
        } else {
            dim(&format!("{pages:>3} pages"))
        };
        self.bar
            .println(format!("  {} {:<40} {}", green("✓"), name, detail));
        self.bar.inc(1);
    }

    fn on_file_error(&self, name: &str, _error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        // Details go to error_log.txt only; keep the console quiet.
        self.bar.println(format!(
            "  {} {:<40} {}",
            red("✗"),
            name,
            dim("see error_log.txt")
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_files: usize, converted: usize) {
        let failed = total_files.saturating_sub(converted);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} archive(s) converted successfully",
                green("✔"),
                bold(&converted.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} archive(s) converted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&converted.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every CBZ/CBR in a directory (batches of 5, 4 workers)
  cb2pdf /comics/inbox

  # Larger batches, more workers, shorter pause
  cb2pdf --batch-size 10 --workers 8 --pause 2 /comics/inbox

  # Machine-readable run summary
  cb2pdf --json --no-progress /comics/inbox > run.json

BEHAVIOUR:
  Outputs land next to the inputs (<name>.pdf). Successfully processed
  archives move to <dir>/original/. Failures are appended to
  <dir>/error_log.txt and never abort the run; the console stays quiet
  about them beyond the progress marks.

ENVIRONMENT VARIABLES:
  CB2PDF_BATCH_SIZE   Files per batch
  CB2PDF_WORKERS      Concurrent jobs per batch
  CB2PDF_PAUSE        Seconds to pause between batches
  CB2PDF_DPI          Resolution hint for output PDFs
"#;

/// Convert comic-book archives (CBZ/CBR) to multi-page PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "cb2pdf",
    version,
    about = "Convert comic-book archives (CBZ/CBR) to multi-page PDFs",
    long_about = "Convert every .cbz/.cbr file in a directory into a multi-page PDF, \
processing files in fixed-size batches with a bounded worker pool. Processed originals \
move into an original/ subdirectory; per-file failures are logged to error_log.txt \
without aborting the run.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the .cbz/.cbr files to convert.
    directory: PathBuf,

    /// Files per batch; batches run strictly in sequence.
    #[arg(short, long, env = "CB2PDF_BATCH_SIZE", default_value_t = 5)]
    batch_size: usize,

    /// Concurrent conversion jobs within a batch.
    #[arg(short, long, env = "CB2PDF_WORKERS", default_value_t = 4)]
    workers: usize,

    /// Pause between batches, in seconds.
    #[arg(short, long, env = "CB2PDF_PAUSE", default_value_t = 10)]
    pause: u64,

    /// Resolution hint for output PDFs, in DPI.
    #[arg(long, env = "CB2PDF_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(36..=1200))]
    dpi: u32,

    /// Output a structured JSON run summary instead of the text one.
    #[arg(long, env = "CB2PDF_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "CB2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CB2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CB2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .batch_size(cli.batch_size)
        .workers(cli.workers)
        .batch_pause(Duration::from_secs(cli.pause))
        .dpi(cli.dpi);
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_dir(&cli.directory, &config)
        .await
        .context("Conversion run failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        // Only print inline stats when the progress callback is disabled.
        println!(
            "Converted {}/{} archive(s) in {} batch(es), {}ms",
            output.stats.converted_files,
            output.stats.total_files,
            output.stats.total_batches,
            output.stats.total_duration_ms
        );
    }

    if !cli.quiet && !cli.json && output.stats.failed_files > 0 {
        eprintln!(
            "   {}",
            dim(&format!(
                "{} failure(s) logged to {}",
                output.stats.failed_files,
                cli.directory.join("error_log.txt").display()
            ))
        );
    }

    Ok(())
}
