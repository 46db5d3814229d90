// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition adapter — owns the lifecycle of the (slow to load) recognition
// engine and hands it out only once it is ready.
//
// States: Uninitialized -> Initializing -> Ready | Failed. A failed adapter
// stays unusable until the next initialisation attempt; every recognition
// request in the meantime fails fast with `EngineNotReady`.

use std::sync::{Arc, RwLock};

use ocrpro_core::error::{OcrProError, Result};
use ocrpro_core::{EngineSettings, StatusBus, StatusEvent};
use ocrpro_document::Recognizer;
use tracing::{error, info, instrument};

enum AdapterState {
    Uninitialized,
    Initializing,
    Ready(Arc<dyn Recognizer>),
    Failed(String),
}

/// Observable adapter state, for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterStatus {
    Uninitialized,
    Initializing,
    Ready { engine: String },
    Failed { reason: String },
}

/// Thread-safe holder for the recognition engine.
pub struct RecognitionAdapter {
    state: RwLock<AdapterState>,
    status: StatusBus,
}

impl RecognitionAdapter {
    pub fn new(status: StatusBus) -> Self {
        Self {
            state: RwLock::new(AdapterState::Uninitialized),
            status,
        }
    }

    /// Load the engine with `open`, blocking the calling thread.
    ///
    /// Publishes `EngineInitializing` and then `EngineReady` or
    /// `EngineFailed`. The state lock is not held while `open` runs.
    #[instrument(skip_all, fields(languages = ?settings.languages, accelerator = settings.use_accelerator))]
    pub fn initialize<F>(&self, settings: &EngineSettings, open: F) -> Result<()>
    where
        F: FnOnce(&EngineSettings) -> Result<Arc<dyn Recognizer>>,
    {
        {
            let mut state = self.state.write().expect("adapter lock poisoned");
            if matches!(*state, AdapterState::Initializing) {
                return Err(OcrProError::RunInProgress);
            }
            *state = AdapterState::Initializing;
        }
        self.status.publish(StatusEvent::EngineInitializing);

        match open(settings) {
            Ok(recognizer) => {
                info!(engine = recognizer.name(), "recognition engine ready");
                *self.state.write().expect("adapter lock poisoned") = AdapterState::Ready(recognizer);
                self.status.publish(StatusEvent::EngineReady);
                Ok(())
            }
            Err(err) => {
                let reason = err.to_string();
                error!(error = %reason, "recognition engine failed to initialise");
                *self.state.write().expect("adapter lock poisoned") =
                    AdapterState::Failed(reason.clone());
                self.status.publish(StatusEvent::EngineFailed { reason });
                Err(err)
            }
        }
    }

    /// The ready engine, or `EngineNotReady` without attempting any work.
    pub fn recognizer(&self) -> Result<Arc<dyn Recognizer>> {
        match &*self.state.read().expect("adapter lock poisoned") {
            AdapterState::Ready(recognizer) => Ok(Arc::clone(recognizer)),
            _ => Err(OcrProError::EngineNotReady),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(
            *self.state.read().expect("adapter lock poisoned"),
            AdapterState::Ready(_)
        )
    }

    pub fn status(&self) -> AdapterStatus {
        match &*self.state.read().expect("adapter lock poisoned") {
            AdapterState::Uninitialized => AdapterStatus::Uninitialized,
            AdapterState::Initializing => AdapterStatus::Initializing,
            AdapterState::Ready(recognizer) => AdapterStatus::Ready {
                engine: recognizer.name().to_string(),
            },
            AdapterState::Failed(reason) => AdapterStatus::Failed {
                reason: reason.clone(),
            },
        }
    }
}
