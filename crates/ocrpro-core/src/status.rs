// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Status channel — structured lifecycle events published by the engine
// initialiser, the batch pipeline, and the exporters.
//
// Two views are offered over the same stream:
//
// - a `watch` channel holding only the *current* status (each publish
//   overwrites the previous one), which is what a status bar renders;
// - a `broadcast` channel carrying every event, for observers that need the
//   full history (progress bars, tests).

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::types::ExportFormat;

/// Capacity of the history channel; slow subscribers observe `Lagged`.
const HISTORY_CAPACITY: usize = 256;

/// A single lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEvent {
    /// Nothing has happened yet.
    Ready,
    ImageAdded { name: String },
    ImageRemoved { name: String },
    /// A removal named a position outside the list.
    RemoveFailed { reason: String },
    EngineInitializing,
    EngineReady,
    EngineFailed { reason: String },
    /// Processing was requested before the engine was ready.
    EngineNotReady,
    /// Processing was requested on an empty collection.
    NothingToProcess,
    /// A background job is already running.
    RunInProgress,
    RunStarted { total: usize },
    /// Published before each item; `index` is 1-based.
    ItemStarted { index: usize, total: usize, name: String },
    ItemFailed {
        index: usize,
        total: usize,
        name: String,
        reason: String,
    },
    RunCompleted { processed: usize, failed: usize },
    Exported { format: ExportFormat, path: PathBuf },
    NothingToExport,
    ExportFailed { format: ExportFormat, reason: String },
}

impl StatusEvent {
    /// Whether the event reports a failure of some kind.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::RemoveFailed { .. }
                | Self::EngineFailed { .. }
                | Self::EngineNotReady
                | Self::ItemFailed { .. }
                | Self::ExportFailed { .. }
        )
    }
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::ImageAdded { name } => write!(f, "Image added: {name}"),
            Self::ImageRemoved { name } => write!(f, "Image removed: {name}"),
            Self::RemoveFailed { reason } => write!(f, "Cannot remove image: {reason}"),
            Self::EngineInitializing => write!(f, "Initialising OCR..."),
            Self::EngineReady => write!(f, "OCR initialised - Ready"),
            Self::EngineFailed { reason } => write!(f, "Error initialising OCR: {reason}"),
            Self::EngineNotReady => write!(f, "OCR not initialised"),
            Self::NothingToProcess => write!(f, "No images to process"),
            Self::RunInProgress => write!(f, "OCR is already running"),
            Self::RunStarted { total } => write!(f, "Processing OCR ({total} image(s))..."),
            Self::ItemStarted { index, total, name } => {
                write!(f, "processing item {index} of {total}: {name}")
            }
            Self::ItemFailed {
                index,
                total,
                name,
                reason,
            } => write!(f, "Error processing {name} ({index}/{total}): {reason}"),
            Self::RunCompleted { processed, failed } if *failed > 0 => {
                write!(f, "OCR completed ({processed} processed, {failed} failed)")
            }
            Self::RunCompleted { .. } => write!(f, "OCR completed"),
            Self::Exported { format, path } => {
                write!(f, "{format} exported to {}", path.display())
            }
            Self::NothingToExport => write!(f, "No extracted text to export"),
            Self::ExportFailed { format, reason } => {
                write!(f, "Error exporting {format}: {reason}")
            }
        }
    }
}

/// An event stamped with the time it was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub event: StatusEvent,
    pub at: DateTime<Utc>,
}

impl StatusUpdate {
    pub fn now(event: StatusEvent) -> Self {
        Self {
            event,
            at: Utc::now(),
        }
    }
}

impl std::fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.event)
    }
}

/// Cloneable publisher shared by every producer of status events.
///
/// Publishing never blocks and never fails, whether or not anyone listens.
#[derive(Debug, Clone)]
pub struct StatusBus {
    current: Arc<watch::Sender<StatusUpdate>>,
    history: broadcast::Sender<StatusUpdate>,
}

impl StatusBus {
    pub fn new() -> Self {
        let (current, _) = watch::channel(StatusUpdate::now(StatusEvent::Ready));
        let (history, _) = broadcast::channel(HISTORY_CAPACITY);
        Self {
            current: Arc::new(current),
            history,
        }
    }

    /// Replace the current status and append it to the history stream.
    pub fn publish(&self, event: StatusEvent) {
        if event.is_error() {
            warn!(status = %event, "status");
        } else {
            debug!(status = %event, "status");
        }
        let update = StatusUpdate::now(event);
        // No subscribers is fine: the watch value is still replaced.
        let _ = self.history.send(update.clone());
        self.current.send_replace(update);
    }

    /// Snapshot of the current status.
    pub fn current(&self) -> StatusUpdate {
        self.current.borrow().clone()
    }

    /// Receiver that always holds the latest status.
    pub fn watch(&self) -> watch::Receiver<StatusUpdate> {
        self.current.subscribe()
    }

    /// Receiver for every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.history.subscribe()
    }
}

impl Default for StatusBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain every event already queued on `rx` without waiting.
#[cfg(any(test, feature = "test-util"))]
pub fn drain_events(rx: &mut broadcast::Receiver<StatusUpdate>) -> Vec<StatusEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(update) => events.push(update.event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    events
}
