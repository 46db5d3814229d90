// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `ocrs`-backed recognition engine.
//
// `ocrs` is a pure-Rust OCR engine backed by neural network models executed
// via `rten`.
//
// # Feature Gate
//
// This module is only available when the `ocr` feature is enabled:
//
// ```toml
// ocrpro-document = { path = "crates/ocrpro-document", features = ["ocr"] }
// ```
//
// # Model Setup
//
// The engine requires two model files:
//
// - **Detection model** (`text-detection.rten`) — locates text regions.
// - **Recognition model** (`text-recognition.rten`) — decodes characters.
//
// Running `ocrs-cli` once downloads both into the default cache directory
// `$XDG_CACHE_HOME/ocrs` (typically `~/.cache/ocrs`).

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage};
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use ocrpro_core::EngineSettings;
use ocrpro_core::error::{OcrProError, Result};
use rten::Model;
use tracing::{debug, info, instrument, warn};

use super::{Recognizer, TextRegion};

/// Well-known filenames for the detection and recognition models.
const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Languages the bundled models can read (Latin script).
const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "fr", "de", "it", "pt", "nl"];

/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Model file locations for [`OcrsRecognizer`].
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub detection: PathBuf,
    pub recognition: PathBuf,
}

impl ModelPaths {
    /// Expect `text-detection.rten` and `text-recognition.rten` inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection: dir.join(DETECTION_MODEL_FILENAME),
            recognition: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Resolve from settings, using the default cache directory when unset.
    pub fn from_settings(settings: &EngineSettings) -> Self {
        match &settings.model_dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::from_dir(default_model_dir()),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        for (kind, path) in [("detection", &self.detection), ("recognition", &self.recognition)] {
            if !path.exists() {
                return Err(OcrProError::EngineUnavailable(format!(
                    "{kind} model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Recognition engine wrapping `ocrs`.
///
/// Model loading is the expensive step; construct once and reuse.
pub struct OcrsRecognizer {
    engine: OcrsEngine,
}

impl OcrsRecognizer {
    /// Load the models named by `settings`.
    ///
    /// `ocrs` runs on the CPU only, so the accelerator hint is logged and
    /// ignored; languages outside the Latin-script set are likewise only
    /// warned about.
    ///
    /// **Important:** `ocrs` and `rten` are 10-100x slower in debug builds.
    #[instrument(skip_all, fields(languages = ?settings.languages, accelerator = settings.use_accelerator))]
    pub fn new(settings: &EngineSettings) -> Result<Self> {
        if settings.use_accelerator {
            info!("accelerator requested; ocrs runs on the CPU");
        }
        for lang in &settings.languages {
            if !SUPPORTED_LANGUAGES.contains(&lang.as_str()) {
                warn!(language = %lang, "language not covered by the ocrs models");
            }
        }

        let paths = ModelPaths::from_settings(settings);
        paths.validate()?;

        info!(path = %paths.detection.display(), "Loading OCR detection model");
        let detection_model = Model::load_file(&paths.detection).map_err(|err| {
            OcrProError::EngineUnavailable(format!(
                "failed to load detection model from {}: {err}",
                paths.detection.display()
            ))
        })?;

        info!(path = %paths.recognition.display(), "Loading OCR recognition model");
        let recognition_model = Model::load_file(&paths.recognition).map_err(|err| {
            OcrProError::EngineUnavailable(format!(
                "failed to load recognition model from {}: {err}",
                paths.recognition.display()
            ))
        })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| OcrProError::EngineUnavailable(format!("failed to initialise OCR engine: {err}")))?;

        info!("OCR engine initialised successfully");
        Ok(Self { engine })
    }
}

impl Recognizer for OcrsRecognizer {
    fn name(&self) -> &str {
        "ocrs"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &GrayImage) -> Result<Vec<TextRegion>> {
        // ocrs expects interleaved colour; replicate the gray channel.
        let rgb = DynamicImage::ImageLuma8(image.clone()).to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            OcrProError::OcrError(format!("failed to create image source ({width}x{height}): {err}"))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| OcrProError::OcrError(format!("OCR preprocessing failed: {err}")))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| OcrProError::OcrError(format!("word detection failed: {err}")))?;
        debug!(word_count = word_rects.len(), "Words detected");

        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        let line_texts = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| OcrProError::OcrError(format!("line recognition failed: {err}")))?;

        // Only line text is kept. ocrs has no per-line confidence, and the
        // rotated line geometry is left out since nothing downstream reads it.
        let regions: Vec<TextRegion> = line_texts
            .iter()
            .flatten()
            .map(|line| line.to_string())
            .filter(|text| !text.trim().is_empty())
            .map(TextRegion::text)
            .collect();

        debug!(regions = regions.len(), "OCR recognition complete");
        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_paths_from_dir() {
        let paths = ModelPaths::from_dir("/tmp/my-models");
        assert_eq!(paths.detection, PathBuf::from("/tmp/my-models/text-detection.rten"));
        assert_eq!(paths.recognition, PathBuf::from("/tmp/my-models/text-recognition.rten"));
    }

    #[test]
    fn missing_models_fail_validation() {
        let settings = EngineSettings {
            model_dir: Some(PathBuf::from("/nonexistent/path/ocr-models")),
            ..EngineSettings::default()
        };
        let result = OcrsRecognizer::new(&settings);
        assert!(matches!(result, Err(OcrProError::EngineUnavailable(_))));
    }
}
