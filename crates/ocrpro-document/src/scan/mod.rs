// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognition — the capability contract the batch pipeline consumes, and
// the optical character recognition (OCR) engine behind it.

#[cfg(feature = "ocr")]
pub mod ocr;

use std::sync::Arc;

use image::GrayImage;
use ocrpro_core::EngineSettings;
use ocrpro_core::error::Result;

#[cfg(feature = "ocr")]
pub use ocr::OcrsRecognizer;

/// Axis-aligned bounding box of a detected region, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One detected piece of text as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    /// Where the text was found, if the engine reports geometry.
    pub bounds: Option<RegionBounds>,
    pub text: String,
    /// Engine confidence in `0.0..=1.0`, if reported.
    pub confidence: Option<f32>,
}

impl TextRegion {
    /// A region carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            bounds: None,
            text: text.into(),
            confidence: None,
        }
    }
}

/// A recognition engine: preprocessed grayscale image in, text regions out.
///
/// Regions are returned in the engine's own order. Implementations must be
/// shareable across threads, although the pipeline never calls them
/// concurrently.
pub trait Recognizer: Send + Sync {
    /// Short engine identifier for logs (e.g. "ocrs").
    fn name(&self) -> &str;

    /// Detect and read all text in `image`.
    fn recognize(&self, image: &GrayImage) -> Result<Vec<TextRegion>>;
}

/// Concatenate region texts with newlines, in the order given.
pub fn join_region_text(regions: &[TextRegion]) -> String {
    regions
        .iter()
        .map(|region| region.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Open the engine compiled into this build.
///
/// Loading models is slow (seconds); call this off the interactive thread.
#[cfg(feature = "ocr")]
pub fn open_default_recognizer(settings: &EngineSettings) -> Result<Arc<dyn Recognizer>> {
    Ok(Arc::new(OcrsRecognizer::new(settings)?))
}

/// Open the engine compiled into this build.
///
/// This build has no engine; enable the `ocr` feature.
#[cfg(not(feature = "ocr"))]
pub fn open_default_recognizer(settings: &EngineSettings) -> Result<Arc<dyn Recognizer>> {
    tracing::warn!(languages = ?settings.languages, "OCR requested but the `ocr` feature is disabled");
    Err(ocrpro_core::OcrProError::EngineUnavailable(
        "this build was compiled without the `ocr` feature".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_keeps_engine_order_and_drops_geometry() {
        let regions = vec![
            TextRegion {
                bounds: Some(RegionBounds {
                    x: 0.0,
                    y: 40.0,
                    width: 10.0,
                    height: 5.0,
                }),
                text: "second line".into(),
                confidence: Some(0.4),
            },
            TextRegion::text("first line"),
        ];
        assert_eq!(join_region_text(&regions), "second line\nfirst line");
    }

    #[test]
    fn join_of_nothing_is_empty() {
        assert_eq!(join_region_text(&[]), "");
    }

    #[cfg(not(feature = "ocr"))]
    #[test]
    fn default_recognizer_unavailable_without_feature() {
        let result = open_default_recognizer(&EngineSettings::default());
        assert!(matches!(
            result,
            Err(ocrpro_core::OcrProError::EngineUnavailable(_))
        ));
    }
}
