// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR Pro Pipeline — recognition-engine lifecycle, the sequential batch
// pipeline, and the background worker that keeps both off the interactive
// thread.  This crate bridges the core collection in `ocrpro-core` and the
// image/recognition code in `ocrpro-document`.

pub mod adapter;
pub mod pipeline;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{AdapterStatus, RecognitionAdapter};
pub use pipeline::{BatchPipeline, run_collection};
pub use worker::{BackgroundWorker, WorkerState};
