//! Integration tests for the batch conversion run.
//!
//! Every test fabricates real CBZ fixtures (zip containers with PNG/JPEG
//! entries) in a temp directory and drives `convert_dir` end to end. RAR
//! fixtures cannot be fabricated (the unrar crate only reads), so the CBR
//! paths are exercised with corrupt files, which is the interesting case
//! anyway.

use cb2pdf::{convert_dir, ConversionConfig};
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use zip::write::SimpleFileOptions;

// ── Fixture helpers ──────────────────────────────────────────────────────────

fn png_bytes(w: u32, h: u32, px: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(px)));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

fn write_cbz(dir: &Path, name: &str, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(dir.join(name)).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (entry_name, data) in entries {
        writer
            .start_file(*entry_name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

fn write_image_cbz(dir: &Path, name: &str, entry_names: &[&str]) {
    let page = png_bytes(6, 8, [120, 40, 200]);
    let entries: Vec<(&str, &[u8])> = entry_names.iter().map(|n| (*n, page.as_slice())).collect();
    write_cbz(dir, name, &entries);
}

/// Config with no inter-batch pause so tests stay fast.
fn test_config() -> ConversionConfig {
    ConversionConfig::builder()
        .batch_pause(Duration::ZERO)
        .build()
        .unwrap()
}

// ── Success path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn converts_pdf_and_relocates_original() {
    let dir = tempfile::tempdir().unwrap();
    write_image_cbz(dir.path(), "vol1.cbz", &["b.png", "a.jpg", "c.jpeg"]);

    let output = convert_dir(dir.path(), &test_config()).await.unwrap();

    assert_eq!(output.stats.total_files, 1);
    assert_eq!(output.stats.converted_files, 1);
    assert_eq!(output.stats.failed_files, 0);

    let outcome = &output.files[0];
    assert_eq!(outcome.pages, 3);

    // PDF next to the (former) input, original moved away.
    let pdf = dir.path().join("vol1.pdf");
    assert!(pdf.exists());
    assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));
    assert!(!dir.path().join("vol1.cbz").exists());
    assert!(dir.path().join("original/vol1.cbz").exists());

    // Clean run leaves no error log behind.
    assert!(!dir.path().join("error_log.txt").exists());
}

#[tokio::test]
async fn jpeg_entries_convert_too() {
    let dir = tempfile::tempdir().unwrap();
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([1, 2, 3])));
    let mut jpeg = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut jpeg),
        image::ImageFormat::Jpeg,
    )
    .unwrap();
    write_cbz(dir.path(), "j.cbz", &[("page.jpg", jpeg.as_slice())]);

    let output = convert_dir(dir.path(), &test_config()).await.unwrap();
    assert_eq!(output.files[0].pages, 1);
    assert!(dir.path().join("j.pdf").exists());
}

// ── Empty archive ────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_archive_is_relocated_without_pdf_or_log() {
    let dir = tempfile::tempdir().unwrap();
    write_cbz(dir.path(), "notes.cbz", &[("readme.txt", b"no pages here")]);

    let output = convert_dir(dir.path(), &test_config()).await.unwrap();

    assert_eq!(output.stats.converted_files, 1);
    assert_eq!(output.stats.empty_archives, 1);
    let outcome = &output.files[0];
    assert!(outcome.is_converted());
    assert!(outcome.pdf_path.is_none());
    assert_eq!(outcome.pages, 0);

    assert!(!dir.path().join("notes.pdf").exists());
    assert!(dir.path().join("original/notes.cbz").exists());
    assert!(!dir.path().join("error_log.txt").exists());
}

// ── Failure paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn corrupt_cbr_is_logged_and_left_in_place() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.cbr"), b"certainly not rar data").unwrap();

    let output = convert_dir(dir.path(), &test_config()).await.unwrap();

    assert_eq!(output.stats.failed_files, 1);
    assert!(dir.path().join("broken.cbr").exists(), "file must not move");
    assert!(!dir.path().join("broken.pdf").exists());

    let log = std::fs::read_to_string(dir.path().join("error_log.txt")).unwrap();
    assert!(
        log.contains("Not a valid RAR file"),
        "unexpected log content: {log:?}"
    );
}

#[tokio::test]
async fn corrupt_cbz_is_logged_and_left_in_place() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.cbz"), b"certainly not zip data").unwrap();

    let output = convert_dir(dir.path(), &test_config()).await.unwrap();

    assert_eq!(output.stats.failed_files, 1);
    assert!(dir.path().join("broken.cbz").exists());

    let log = std::fs::read_to_string(dir.path().join("error_log.txt")).unwrap();
    assert!(
        log.contains("Error processing CBZ"),
        "unexpected log content: {log:?}"
    );
    assert!(log.contains("broken.cbz"));
}

#[tokio::test]
async fn undecodable_page_uses_generic_template() {
    let dir = tempfile::tempdir().unwrap();
    // Valid zip, but the "image" entry holds junk: the open stage succeeds
    // and the failure surfaces at decode time.
    write_cbz(dir.path(), "junkpage.cbz", &[("p1.jpg", b"not an image")]);

    let output = convert_dir(dir.path(), &test_config()).await.unwrap();
    assert_eq!(output.stats.failed_files, 1);
    assert!(dir.path().join("junkpage.cbz").exists());

    let log = std::fs::read_to_string(dir.path().join("error_log.txt")).unwrap();
    assert!(
        log.contains("Failed to process junkpage.cbz"),
        "unexpected log content: {log:?}"
    );
}

#[tokio::test]
async fn one_bad_file_does_not_abort_its_batch() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..4 {
        write_image_cbz(dir.path(), &format!("good{i}.cbz"), &["p1.png", "p2.png"]);
    }
    std::fs::write(dir.path().join("bad.cbr"), b"garbage").unwrap();

    // All five fit in one batch; four must still convert.
    let output = convert_dir(dir.path(), &test_config()).await.unwrap();

    assert_eq!(output.stats.total_files, 5);
    assert_eq!(output.stats.converted_files, 4);
    assert_eq!(output.stats.failed_files, 1);
    for i in 0..4 {
        assert!(dir.path().join(format!("good{i}.pdf")).exists());
        assert!(dir.path().join(format!("original/good{i}.cbz")).exists());
    }
    assert!(dir.path().join("bad.cbr").exists());
}

// ── Batching ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn twelve_files_make_three_batches() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..12 {
        write_image_cbz(dir.path(), &format!("v{i:02}.cbz"), &["p.png"]);
    }

    let hook_calls = Arc::new(AtomicUsize::new(0));
    let hook_counter = Arc::clone(&hook_calls);
    let config = ConversionConfig::builder()
        .batch_size(5)
        .batch_pause(Duration::ZERO)
        .release_hook(Arc::new(move || {
            hook_counter.fetch_add(1, Ordering::SeqCst);
        }))
        .build()
        .unwrap();

    let output = convert_dir(dir.path(), &config).await.unwrap();

    assert_eq!(output.stats.total_batches, 3);
    assert_eq!(output.stats.converted_files, 12);
    // The release hook runs once per batch, after its jobs finish.
    assert_eq!(hook_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn pause_runs_between_batches_but_not_after_the_last() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..4 {
        write_image_cbz(dir.path(), &format!("v{i}.cbz"), &["p.png"]);
    }

    // 2 batches → exactly one pause.
    let config = ConversionConfig::builder()
        .batch_size(2)
        .batch_pause(Duration::from_millis(250))
        .build()
        .unwrap();
    let start = std::time::Instant::now();
    let output = convert_dir(dir.path(), &config).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(output.stats.total_batches, 2);
    assert!(
        elapsed >= Duration::from_millis(250),
        "expected one inter-batch pause, elapsed {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_millis(2000),
        "looks like more than one pause ran, elapsed {elapsed:?}"
    );
}

// ── Invariants ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn every_file_gets_exactly_one_outcome() {
    let dir = tempfile::tempdir().unwrap();
    write_image_cbz(dir.path(), "ok.cbz", &["p.png"]);
    write_cbz(dir.path(), "empty.cbz", &[("x.txt", b"no images")]);
    std::fs::write(dir.path().join("bad.cbr"), b"junk").unwrap();

    let output = convert_dir(dir.path(), &test_config()).await.unwrap();
    assert_eq!(output.files.len(), 3);

    for outcome in &output.files {
        let original = dir.path().join("original").join(&outcome.name);
        let in_place = dir.path().join(&outcome.name);
        if outcome.is_converted() {
            // Converted: relocated, and a PDF exists iff pages were written.
            assert!(original.exists(), "{} not relocated", outcome.name);
            assert!(!in_place.exists());
            assert_eq!(
                outcome.pdf_path.as_ref().map(|p| p.exists()),
                (outcome.pages > 0).then_some(true),
            );
        } else {
            // Failed: logged, left in place, no PDF.
            assert!(in_place.exists(), "{} moved despite failure", outcome.name);
            assert!(!original.exists());
            assert!(outcome.pdf_path.is_none());
        }
    }
    let log = std::fs::read_to_string(dir.path().join("error_log.txt")).unwrap();
    assert_eq!(log.lines().count(), 1, "one failure, one log line");
}

#[tokio::test]
async fn rerun_finds_nothing_to_do() {
    let dir = tempfile::tempdir().unwrap();
    write_image_cbz(dir.path(), "once.cbz", &["p.png"]);

    let first = convert_dir(dir.path(), &test_config()).await.unwrap();
    assert_eq!(first.stats.converted_files, 1);

    // Relocated files are invisible to a second discovery pass.
    let second = convert_dir(dir.path(), &test_config()).await.unwrap();
    assert_eq!(second.stats.total_files, 0);
    assert_eq!(second.stats.total_batches, 0);
    assert!(second.files.is_empty());
}

#[tokio::test]
async fn unusable_source_path_is_a_fatal_error() {
    // A regular file in place of the source directory: setup cannot create
    // original/ below it, and the error propagates instead of being logged.
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("file.txt");
    std::fs::write(&not_a_dir, b"plain file").unwrap();

    let err = convert_dir(&not_a_dir, &test_config()).await.unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("archive subdirectory") || msg.contains("source directory"),
        "got: {msg}"
    );
}
