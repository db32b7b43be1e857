//! PDF assembly: decoded pages → one multi-page PDF on disk.
//!
//! Each page image is re-encoded to PNG (lossless, so the pixel data from
//! the archive survives untouched) and embedded as an image xobject on a
//! page sized to the pixel dimensions at the configured DPI. The DPI is a
//! resolution hint only; it fixes the physical page size a viewer reports
//! without resampling anything.

use image::DynamicImage;
use printpdf::ops::Op;
use printpdf::xobject::{XObject, XObjectTransform};
use printpdf::{PdfDocument, PdfPage, PdfSaveOptions, Pt, XObjectId};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tracing::debug;

/// Write `pages` (already in page order) as a single PDF at `pdf_path`.
///
/// Returns the number of pages written. The caller guarantees `pages` is
/// non-empty; an empty archive never reaches this stage.
pub fn write_pdf(
    title: &str,
    pages: &[(String, DynamicImage)],
    pdf_path: &Path,
    dpi: u32,
) -> Result<usize, String> {
    let mut doc = PdfDocument::new(title);
    let mut pdf_pages = Vec::with_capacity(pages.len());

    for (name, img) in pages {
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| format!("page '{name}': failed to re-encode: {e}"))?;

        let mut warnings = Vec::new();
        let raw = printpdf::image::RawImage::decode_from_bytes(&png, &mut warnings)
            .map_err(|e| format!("page '{name}': failed to embed: {e}"))?;
        let (w_px, h_px) = (raw.width as f32, raw.height as f32);

        let xobj_id = XObjectId::new();
        doc.resources
            .xobjects
            .map
            .insert(xobj_id.clone(), XObject::Image(raw));

        let transform = XObjectTransform {
            translate_x: None,
            translate_y: None,
            scale_x: None,
            scale_y: None,
            rotate: None,
            dpi: Some(dpi as f32),
        };
        let ops = vec![Op::UseXobject {
            id: xobj_id,
            transform,
        }];

        // Page size in points: px * 72 / dpi, so the image fills the page.
        let width = Pt(w_px * 72.0 / dpi as f32);
        let height = Pt(h_px * 72.0 / dpi as f32);
        pdf_pages.push(PdfPage::new(width.into(), height.into(), ops));
    }

    let count = pdf_pages.len();
    doc.pages = pdf_pages;

    let file = std::fs::File::create(pdf_path)
        .map_err(|e| format!("failed to create '{}': {e}", pdf_path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut warnings = Vec::new();
    doc.save_writer(&mut writer, &PdfSaveOptions::default(), &mut warnings);
    writer
        .flush()
        .map_err(|e| format!("failed to write '{}': {e}", pdf_path.display()))?;

    debug!("Wrote {} page(s) to {}", count, pdf_path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn rgb_page(w: u32, h: u32, px: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(px)))
    }

    #[test]
    fn writes_a_pdf_with_one_page_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("out.pdf");
        let pages = vec![
            ("a.jpg".to_string(), rgb_page(8, 12, [255, 0, 0])),
            ("b.png".to_string(), rgb_page(10, 10, [0, 255, 0])),
        ];

        let count = write_pdf("out", &pages, &pdf_path, 300).unwrap();
        assert_eq!(count, 2);

        let bytes = std::fs::read(&pdf_path).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "output is not a PDF");
    }

    #[test]
    fn unwritable_target_is_an_error() {
        let pages = vec![("a.png".to_string(), rgb_page(2, 2, [0, 0, 0]))];
        let err = write_pdf("x", &pages, Path::new("/no/such/dir/x.pdf"), 300).unwrap_err();
        assert!(err.contains("failed to create"), "got: {err}");
    }
}
