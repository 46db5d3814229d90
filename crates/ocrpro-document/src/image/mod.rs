// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding, OCR preprocessing, and preview thumbnails.

pub mod preprocess;
pub mod preview;

pub use preprocess::{ContrastRemap, preprocess};
pub use preview::{load_image, thumbnail};
