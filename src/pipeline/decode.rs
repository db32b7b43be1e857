//! Image decoding: raw entry bytes → 8-bit RGB.
//!
//! Every page is normalised to 3-channel RGB regardless of how it was stored
//! in the archive — greyscale, palette PNG, and RGBA sources all come out as
//! plain RGB so the PDF stage only deals with one pixel layout. Alpha is
//! dropped, not composited; comic pages do not use it meaningfully.

use image::DynamicImage;
use tracing::debug;

/// Decode one archive entry into an RGB image.
pub fn decode_entry(name: &str, data: &[u8]) -> Result<DynamicImage, image::ImageError> {
    let img = image::load_from_memory(data)?;
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    debug!("Decoded '{}' ({}x{})", name, rgb.width(), rgb.height());
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn rgba_png_is_normalised_to_rgb() {
        let src = RgbaImage::from_pixel(4, 6, Rgba([10, 20, 30, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(src)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_entry("p.png", &bytes).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageRgb8(_)));
        assert_eq!((decoded.width(), decoded.height()), (4, 6));
    }

    #[test]
    fn non_image_bytes_fail() {
        assert!(decode_entry("junk", b"definitely not an image").is_err());
    }
}
