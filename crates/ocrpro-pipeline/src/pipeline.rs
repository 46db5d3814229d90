// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch pipeline — runs every entry of a collection snapshot through
// decode -> preprocess -> recognise, strictly in order.
//
// A failure on one entry (unreadable file, corrupt data, engine error, even
// an engine panic) is recorded as that entry's outcome and never aborts the
// run. Only the two preconditions fail the run as a whole: the engine must be
// ready and the snapshot must be non-empty.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ocrpro_core::error::{OcrProError, Result};
use ocrpro_core::{
    ImageCollection, ImageEntry, ItemOutcome, ItemResult, RunReport, StatusBus, StatusEvent,
};
use ocrpro_document::image::load_image;
use ocrpro_document::{Recognizer, join_region_text, preprocess};
use tracing::{debug, info, instrument, warn};

use crate::adapter::RecognitionAdapter;

/// A prepared run: a ready engine plus the status channel to report on.
pub struct BatchPipeline {
    recognizer: Arc<dyn Recognizer>,
    status: StatusBus,
}

impl BatchPipeline {
    pub fn new(recognizer: Arc<dyn Recognizer>, status: StatusBus) -> Self {
        Self { recognizer, status }
    }

    /// Check the run preconditions without touching any image.
    ///
    /// Publishes `EngineNotReady` or `NothingToProcess` on failure.
    pub fn prepare(adapter: &RecognitionAdapter, status: &StatusBus, items: usize) -> Result<Self> {
        let recognizer = match adapter.recognizer() {
            Ok(recognizer) => recognizer,
            Err(err) => {
                status.publish(StatusEvent::EngineNotReady);
                return Err(err);
            }
        };
        if items == 0 {
            status.publish(StatusEvent::NothingToProcess);
            return Err(OcrProError::EmptyCollection);
        }
        Ok(Self::new(recognizer, status.clone()))
    }

    /// Process `snapshot` in order and report one outcome per entry.
    ///
    /// Publishes `RunStarted`, then `ItemStarted` (and `ItemFailed` where
    /// applicable) for each entry. `RunCompleted` is left to the caller,
    /// which publishes it once the results have been stored.
    #[instrument(skip_all, fields(engine = self.recognizer.name(), items = snapshot.len()))]
    pub fn run(&self, snapshot: &[ImageEntry]) -> RunReport {
        let total = snapshot.len();
        self.status.publish(StatusEvent::RunStarted { total });

        let mut results = Vec::with_capacity(total);
        for (offset, entry) in snapshot.iter().enumerate() {
            let index = offset + 1;
            let name = entry.file_name();
            self.status.publish(StatusEvent::ItemStarted {
                index,
                total,
                name: name.clone(),
            });

            let outcome = match self.process_isolated(entry) {
                Ok(text) => {
                    debug!(index, chars = text.len(), "entry recognised");
                    ItemOutcome::Recognized(text)
                }
                Err(reason) => {
                    warn!(index, entry = %name, error = %reason, "entry failed");
                    self.status.publish(StatusEvent::ItemFailed {
                        index,
                        total,
                        name,
                        reason: reason.clone(),
                    });
                    ItemOutcome::Failed(reason)
                }
            };
            results.push(ItemResult {
                id: entry.id,
                position: index,
                outcome,
            });
        }

        let report = RunReport { results };
        info!(
            processed = report.processed(),
            failed = report.failed(),
            "batch run finished"
        );
        report
    }

    /// Run one entry, turning both errors and engine panics into a reason.
    fn process_isolated(&self, entry: &ImageEntry) -> std::result::Result<String, String> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.process_entry(entry))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(err.to_string()),
            Err(payload) => {
                let detail = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                Err(format!("recognition engine panicked: {detail}"))
            }
        }
    }

    fn process_entry(&self, entry: &ImageEntry) -> Result<String> {
        let decoded = load_image(entry.path())?;
        let gray = preprocess(&decoded);
        let regions = self.recognizer.recognize(&gray)?;
        Ok(join_region_text(&regions))
    }
}

/// Run a whole collection synchronously and store the results.
///
/// This is the blocking form of [`crate::BackgroundWorker::start_run`]: it
/// snapshots the collection, processes the snapshot, writes outcomes back
/// by entry id, and publishes `RunCompleted`.
pub fn run_collection(
    adapter: &RecognitionAdapter,
    status: &StatusBus,
    collection: &mut ImageCollection,
) -> Result<RunReport> {
    let pipeline = BatchPipeline::prepare(adapter, status, collection.len())?;
    let snapshot = collection.snapshot();
    let report = pipeline.run(&snapshot);
    collection.apply_results(&report);
    status.publish(StatusEvent::RunCompleted {
        processed: report.processed(),
        failed: report.failed(),
    });
    Ok(report)
}
