// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR preprocessing — turns a decoded raster of any channel layout into a
// contrast-enhanced single-channel image for the recognition engine.
//
// Every step is pure and uses integer/IEEE arithmetic only, so the output is
// bit-identical on every target:
//
// 1. drop the alpha channel (no compositing);
// 2. grayscale with the fixed BT.601 luma weights (0.299, 0.587, 0.114);
// 3. remap each pixel to `clamp(round(gain * v + offset), 0, 255)`.

use image::{DynamicImage, GrayImage, Luma, Rgb};
use imageproc::map::map_colors;
use tracing::{debug, instrument};

/// BT.601 luma weights in 14-bit fixed point (sum = 1 << 14).
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Linear contrast/brightness remap applied after grayscale conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastRemap {
    /// Multiplicative gain.
    pub gain: f32,
    /// Additive offset, applied after the gain.
    pub offset: f32,
}

impl ContrastRemap {
    /// The remap used for every OCR input: gain 1.2, offset +30.
    pub const OCR: Self = Self {
        gain: 1.2,
        offset: 30.0,
    };

    /// Remap a single value; out-of-range results saturate.
    pub fn apply(&self, value: u8) -> u8 {
        let mapped = (self.gain * f32::from(value) + self.offset).round();
        mapped.clamp(0.0, 255.0) as u8
    }

    fn lookup_table(&self) -> [u8; 256] {
        let mut table = [0u8; 256];
        for (value, slot) in table.iter_mut().enumerate() {
            *slot = self.apply(value as u8);
        }
        table
    }
}

impl Default for ContrastRemap {
    fn default() -> Self {
        Self::OCR
    }
}

/// Run the full preprocessing stage with the standard OCR remap.
pub fn preprocess(image: &DynamicImage) -> GrayImage {
    preprocess_with(image, ContrastRemap::OCR)
}

/// Run the full preprocessing stage with a custom remap.
#[instrument(skip_all, fields(width = image.width(), height = image.height(), color = ?image.color()))]
pub fn preprocess_with(image: &DynamicImage, remap: ContrastRemap) -> GrayImage {
    let opaque = flatten_alpha(image);
    let gray = to_grayscale(&opaque);
    let enhanced = enhance_contrast(&gray, remap);
    debug!("Preprocessing complete");
    enhanced
}

/// Discard the alpha channel, keeping the colour (or luma) channels as-is.
pub fn flatten_alpha(image: &DynamicImage) -> DynamicImage {
    let color = image.color();
    if !color.has_alpha() {
        return image.clone();
    }
    if color.has_color() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        DynamicImage::ImageLuma8(image.to_luma8())
    }
}

/// Convert to 8-bit grayscale using the fixed BT.601 luma weights.
///
/// Single-channel inputs are passed through (after bit-depth reduction).
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    if !image.color().has_color() {
        return image.to_luma8();
    }
    let rgb = image.to_rgb8();
    map_colors(&rgb, |Rgb([r, g, b])| Luma([luma(r, g, b)]))
}

/// Apply `remap` to every pixel of a grayscale image.
pub fn enhance_contrast(gray: &GrayImage, remap: ContrastRemap) -> GrayImage {
    let table = remap.lookup_table();
    map_colors(gray, |Luma([v])| Luma([table[usize::from(v)]]))
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * LUMA_R + u32::from(g) * LUMA_G + u32::from(b) * LUMA_B;
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, LumaA, RgbImage, Rgba, RgbaImage};

    fn gradient_rgba(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 7 % 256) as u8,
                (y * 13 % 256) as u8,
                ((x + y) * 5 % 256) as u8,
                ((x * y) % 256) as u8,
            ])
        })
    }

    #[test]
    fn remap_matches_gain_and_offset() {
        let remap = ContrastRemap::OCR;
        assert_eq!(remap.apply(0), 30);
        assert_eq!(remap.apply(10), 42);
        assert_eq!(remap.apply(100), 150);
        // 1.2 * 187 + 30 = 254.4
        assert_eq!(remap.apply(187), 254);
        // Saturates instead of wrapping.
        assert_eq!(remap.apply(200), 255);
        assert_eq!(remap.apply(255), 255);
    }

    #[test]
    fn luma_weights_are_bt601() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn output_is_single_channel_with_same_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(31, 17, Rgb([10, 20, 30])));
        let out = preprocess(&img);
        assert_eq!(out.dimensions(), (31, 17));
    }

    #[test]
    fn alpha_input_matches_alpha_stripped_input() {
        let rgba = gradient_rgba(40, 30);
        let rgb = RgbImage::from_fn(40, 30, |x, y| {
            let Rgba([r, g, b, _]) = *rgba.get_pixel(x, y);
            Rgb([r, g, b])
        });

        let from_rgba = preprocess(&DynamicImage::ImageRgba8(rgba));
        let from_rgb = preprocess(&DynamicImage::ImageRgb8(rgb));
        assert_eq!(from_rgba, from_rgb);
    }

    #[test]
    fn gray_alpha_input_matches_gray_input() {
        let la = GrayAlphaImage::from_fn(8, 8, |x, y| LumaA([(x * 30 + y) as u8, (y * 20) as u8]));
        let l = GrayImage::from_fn(8, 8, |x, y| Luma([(x * 30 + y) as u8]));

        let from_la = preprocess(&DynamicImage::ImageLumaA8(la));
        let from_l = preprocess(&DynamicImage::ImageLuma8(l));
        assert_eq!(from_la, from_l);
    }

    #[test]
    fn grayscale_input_is_only_remapped() {
        let gray = GrayImage::from_pixel(4, 4, Luma([100]));
        let out = preprocess(&DynamicImage::ImageLuma8(gray));
        assert!(out.pixels().all(|p| p.0[0] == 150));
    }

    #[test]
    fn preprocessing_is_deterministic() {
        let img = DynamicImage::ImageRgba8(gradient_rgba(64, 48));
        assert_eq!(preprocess(&img), preprocess(&img));
    }
}
