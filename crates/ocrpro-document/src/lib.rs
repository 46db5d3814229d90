// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrpro-document — Image and document handling for OCR Pro.
//
// Provides image decoding and OCR preprocessing (alpha flattening, luma
// grayscale, fixed contrast/brightness remap), the recognition-engine
// capability trait with an `ocrs`-backed implementation, preview thumbnails,
// and the two export serializers (flat text and paginated PDF).

pub mod export;
pub mod image;
pub mod scan;

// Re-export the primary items so callers can use `ocrpro_document::preprocess` etc.
pub use export::export_to_dir;
pub use export::pdf::PaginatedWriter;
pub use crate::image::preprocess::{ContrastRemap, preprocess};
pub use scan::{Recognizer, RegionBounds, TextRegion, join_region_text, open_default_recognizer};

#[cfg(feature = "ocr")]
pub use scan::ocr::OcrsRecognizer;
