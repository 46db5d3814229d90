// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image decoding and preview thumbnails.

use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;
use ocrpro_core::error::{OcrProError, Result};
use tracing::{debug, instrument};

/// Longest edge of the preview thumbnail, in pixels.
pub const PREVIEW_SIZE: u32 = 400;

/// Decode the image at `path`, guessing the format from its content.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let reader = image::ImageReader::open(path)?
        .with_guessed_format()
        .map_err(|err| OcrProError::ImageError(format!("failed to read {}: {err}", path.display())))?;
    let img = reader
        .decode()
        .map_err(|err| OcrProError::ImageError(format!("failed to decode {}: {err}", path.display())))?;
    debug!(width = img.width(), height = img.height(), "Image decoded");
    Ok(img)
}

/// Shrink `image` to fit within `max_edge` x `max_edge`, preserving aspect
/// ratio. Images that already fit are returned unchanged (never upscaled).
pub fn thumbnail(image: &DynamicImage, max_edge: u32) -> DynamicImage {
    if image.width() <= max_edge && image.height() <= max_edge {
        return image.clone();
    }
    image.resize(max_edge, max_edge, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn thumbnail_fits_within_bounds() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1200, 600, Rgb([1, 2, 3])));
        let thumb = thumbnail(&img, PREVIEW_SIZE);
        assert_eq!(thumb.width(), 400);
        assert_eq!(thumb.height(), 200);
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 80, Rgb([1, 2, 3])));
        let thumb = thumbnail(&img, PREVIEW_SIZE);
        assert_eq!((thumb.width(), thumb.height()), (50, 80));
    }

    #[test]
    fn load_image_reads_png_regardless_of_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mislabelled.jpg");
        RgbImage::from_pixel(6, 4, Rgb([9, 9, 9]))
            .save_with_format(&path, image::ImageFormat::Png)
            .expect("write png");

        let img = load_image(&path).expect("decode");
        assert_eq!((img.width(), img.height()), (6, 4));
    }

    #[test]
    fn load_image_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"definitely not an image").expect("write");

        let err = load_image(&path).expect_err("garbage must not decode");
        assert!(matches!(err, OcrProError::ImageError(_)));
    }

    #[test]
    fn load_image_missing_file_is_io_error() {
        let err = load_image("/nonexistent/ocrpro/missing.png").expect_err("missing file");
        assert!(matches!(err, OcrProError::Io(_)));
    }
}
