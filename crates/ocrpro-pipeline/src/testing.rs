// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles shared by the adapter, pipeline, and worker tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{GrayImage, Rgb, RgbImage};
use ocrpro_core::OcrProError;
use ocrpro_core::error::Result;
use ocrpro_document::{Recognizer, TextRegion};

/// Reports the image size as text and records every call.
///
/// Images whose width equals `fail_on_width` produce an engine error;
/// width `panic_on_width` makes the engine panic.
#[derive(Default)]
pub struct ScriptedRecognizer {
    pub fail_on_width: Option<u32>,
    pub panic_on_width: Option<u32>,
    pub calls: AtomicUsize,
    pub seen_widths: Mutex<Vec<u32>>,
}

impl Recognizer for ScriptedRecognizer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<TextRegion>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_widths
            .lock()
            .expect("widths lock")
            .push(image.width());
        if self.panic_on_width == Some(image.width()) {
            panic!("engine blew up");
        }
        if self.fail_on_width == Some(image.width()) {
            return Err(OcrProError::OcrError("engine rejected image".into()));
        }
        Ok(vec![
            TextRegion::text(format!("width {}", image.width())),
            TextRegion::text(format!("height {}", image.height())),
        ])
    }
}

/// Write a solid PNG of `width` x 8 pixels into `dir`.
pub fn write_png(dir: &Path, name: &str, width: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, 8, Rgb([200, 200, 200]))
        .save_with_format(&path, image::ImageFormat::Png)
        .expect("write png fixture");
    path
}

/// Write a file with an image extension but undecodable contents.
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"not an image at all").expect("write corrupt fixture");
    path
}
