// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for OCR Pro.

use thiserror::Error;

/// Top-level error type for all OCR Pro operations.
#[derive(Debug, Error)]
pub enum OcrProError {
    // -- Collection errors --
    #[error("index {index} is out of bounds for a collection of {len} image(s)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("there are no images to process")]
    EmptyCollection,

    // -- Image / recognition errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("OCR engine is not initialised")]
    EngineNotReady,

    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    // -- Background execution --
    #[error("an OCR job is already running")]
    RunInProgress,

    #[error("background task failed: {0}")]
    Worker(String),

    // -- Export errors --
    #[error("no extracted text to export")]
    NothingToExport,

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, OcrProError>;
