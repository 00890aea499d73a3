//! Image enhancement: an opaque bytes → bytes transform applied before OCR.
//!
//! The pipeline treats enhancement as a pure, potentially-failing collaborator
//! behind the [`PageEnhancer`] trait; callers can inject their own (deskew,
//! denoise, adaptive binarisation, an external service) via
//! [`crate::config::ExtractionConfigBuilder::enhancer`]. The built-in
//! [`ContrastEnhancer`] covers the common scanned-page case: grayscale
//! conversion plus a contrast push, which lifts faint toner text clear of the
//! paper background without inventing detail the OCR engine could misread.

use crate::error::EnhanceError;
use image::ImageFormat;
use std::io::Cursor;
use tracing::debug;

/// A preprocessing transform applied to one page image before recognition.
///
/// Implementations must be `Send + Sync`: pages are enhanced concurrently on
/// blocking-pool threads. The input and output are both encoded images (PNG
/// in, PNG out for the built-in implementation).
pub trait PageEnhancer: Send + Sync {
    fn enhance(&self, image_bytes: &[u8]) -> Result<Vec<u8>, EnhanceError>;
}

/// Default enhancer: grayscale + contrast boost.
pub struct ContrastEnhancer {
    /// Contrast adjustment in the `image` crate's percentage scale.
    contrast: f32,
}

impl ContrastEnhancer {
    pub fn new(contrast: f32) -> Self {
        Self { contrast }
    }
}

impl Default for ContrastEnhancer {
    fn default() -> Self {
        // 25.0 keeps mid-grey pencil marks legible while separating print
        // from paper; higher values start eating thin diacritics.
        Self { contrast: 25.0 }
    }
}

impl PageEnhancer for ContrastEnhancer {
    fn enhance(&self, image_bytes: &[u8]) -> Result<Vec<u8>, EnhanceError> {
        let img = image::load_from_memory(image_bytes)
            .map_err(|e| EnhanceError::new(format!("decode: {e}")))?;

        let enhanced = img.grayscale().adjust_contrast(self.contrast);

        let mut buf = Vec::new();
        enhanced
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| EnhanceError::new(format!("encode: {e}")))?;

        debug!(
            "Enhanced page image: {} bytes in, {} bytes out",
            image_bytes.len(),
            buf.len()
        );
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_fixture(w: u32, h: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            w,
            h,
            Rgba([120, 130, 140, 255]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode fixture");
        buf
    }

    #[test]
    fn enhance_produces_decodable_png() {
        let input = png_fixture(16, 16);
        let out = ContrastEnhancer::default()
            .enhance(&input)
            .expect("enhance should succeed");
        let decoded = image::load_from_memory(&out).expect("output must decode");
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn enhance_rejects_garbage_bytes() {
        let err = ContrastEnhancer::default()
            .enhance(b"definitely not an image")
            .unwrap_err();
        assert!(err.to_string().contains("decode"));
    }

    #[test]
    fn enhanced_output_is_grayscale() {
        let input = png_fixture(8, 8);
        let out = ContrastEnhancer::default().enhance(&input).unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();
        let px = decoded.get_pixel(4, 4);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }
}
