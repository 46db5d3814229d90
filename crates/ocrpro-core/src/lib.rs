// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR Pro — Core types, the ordered image collection, the status channel, and
// error definitions shared across all crates.

pub mod collection;
pub mod config;
pub mod error;
pub mod status;
pub mod types;

pub use collection::ImageCollection;
pub use config::{AppConfig, EngineSettings};
pub use error::OcrProError;
pub use status::{StatusBus, StatusEvent, StatusUpdate};
pub use types::*;
