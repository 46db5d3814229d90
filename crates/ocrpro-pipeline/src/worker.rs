// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background worker — moves engine initialisation and batch runs onto
// tokio's blocking pool so the interactive side stays responsive.
//
// Both operations return the task's `JoinHandle`; awaiting it yields the
// job's result. Only one job runs at a time: a second request while one is
// in flight is rejected with `RunInProgress` instead of being queued.

use std::sync::{Arc, Mutex};

use ocrpro_core::error::{OcrProError, Result};
use ocrpro_core::{EngineSettings, ImageCollection, RunReport, StatusBus, StatusEvent};
use ocrpro_document::Recognizer;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::adapter::RecognitionAdapter;
use crate::pipeline::BatchPipeline;

/// What the worker is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Initializing,
    Running,
    /// The last batch run finished; a new one may start.
    Completed,
}

impl WorkerState {
    fn is_busy(self) -> bool {
        matches!(self, Self::Initializing | Self::Running)
    }
}

/// Holds the worker busy until dropped, then records how the job ended.
struct BusyGuard {
    state: Arc<Mutex<WorkerState>>,
    on_release: WorkerState,
}

impl BusyGuard {
    fn finish_as(&mut self, state: WorkerState) {
        self.on_release = state;
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        // Runs during unwinding too, so a panicking job still frees the worker.
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = self.on_release;
    }
}

/// Runs engine initialisation and batch OCR off the calling thread.
#[derive(Clone)]
pub struct BackgroundWorker {
    adapter: Arc<RecognitionAdapter>,
    status: StatusBus,
    state: Arc<Mutex<WorkerState>>,
}

impl BackgroundWorker {
    pub fn new(status: StatusBus) -> Self {
        Self {
            adapter: Arc::new(RecognitionAdapter::new(status.clone())),
            status,
            state: Arc::new(Mutex::new(WorkerState::Idle)),
        }
    }

    pub fn adapter(&self) -> &Arc<RecognitionAdapter> {
        &self.adapter
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().expect("worker state lock poisoned")
    }

    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    /// Mark the worker busy, or publish `RunInProgress` if it already is.
    fn acquire(&self, next: WorkerState) -> Result<BusyGuard> {
        let mut state = self.state.lock().expect("worker state lock poisoned");
        if state.is_busy() {
            warn!(current = ?*state, "background job already running");
            self.status.publish(StatusEvent::RunInProgress);
            return Err(OcrProError::RunInProgress);
        }
        let previous = *state;
        *state = next;
        Ok(BusyGuard {
            state: Arc::clone(&self.state),
            on_release: previous,
        })
    }

    /// Load the recognition engine in the background.
    ///
    /// Must be called from within a tokio runtime. The handle resolves to the
    /// initialisation result; the outcome is also published as
    /// `EngineReady` / `EngineFailed`.
    pub fn initialize<F>(&self, settings: EngineSettings, open: F) -> Result<JoinHandle<Result<()>>>
    where
        F: FnOnce(&EngineSettings) -> Result<Arc<dyn Recognizer>> + Send + 'static,
    {
        let runtime = current_runtime()?;
        let mut guard = self.acquire(WorkerState::Initializing)?;
        guard.finish_as(WorkerState::Idle);
        let adapter = Arc::clone(&self.adapter);

        debug!("spawning engine initialisation");
        Ok(runtime.spawn_blocking(move || {
            let _guard = guard;
            adapter.initialize(&settings, open)
        }))
    }

    /// Start a batch run over `collection` in the background.
    ///
    /// The preconditions are checked before anything is spawned, so an
    /// unready engine or an empty collection is reported immediately. The
    /// collection is snapshotted here; edits made while the run is in flight
    /// do not affect which images are processed. Results are written back by
    /// entry id when the run ends, then `RunCompleted` is published.
    pub fn start_run(
        &self,
        collection: Arc<Mutex<ImageCollection>>,
    ) -> Result<JoinHandle<Result<RunReport>>> {
        let runtime = current_runtime()?;
        let mut guard = self.acquire(WorkerState::Running)?;

        let snapshot = {
            let collection = lock_collection(&collection)?;
            let pipeline = BatchPipeline::prepare(&self.adapter, &self.status, collection.len())?;
            (pipeline, collection.snapshot())
        };
        guard.finish_as(WorkerState::Completed);

        let status = self.status.clone();
        info!(items = snapshot.1.len(), "starting background OCR run");
        Ok(runtime.spawn_blocking(move || {
            let _guard = guard;
            let (pipeline, entries) = snapshot;
            let report = pipeline.run(&entries);

            let applied = lock_collection(&collection)?.apply_results(&report);
            debug!(applied, "run results stored");
            status.publish(StatusEvent::RunCompleted {
                processed: report.processed(),
                failed: report.failed(),
            });
            Ok(report)
        }))
    }
}

fn current_runtime() -> Result<tokio::runtime::Handle> {
    tokio::runtime::Handle::try_current()
        .map_err(|err| OcrProError::Worker(format!("no async runtime available: {err}")))
}

fn lock_collection(
    collection: &Mutex<ImageCollection>,
) -> Result<std::sync::MutexGuard<'_, ImageCollection>> {
    collection
        .lock()
        .map_err(|_| OcrProError::Worker("collection lock poisoned".into()))
}
