// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — owns the image collection, the background worker,
// the status channel, and the configuration, and exposes the operations the
// front-end calls.
//
// The collection is shared with background runs, so it lives behind
// `Arc<Mutex<>>`. Every lock is held only for quick in-memory edits; image
// decoding and recognition happen on a snapshot outside the lock.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ocrpro_core::error::{OcrProError, Result};
use ocrpro_core::{
    AppConfig, EngineSettings, ExportFormat, ImageCollection, ImageEntry, MoveDirection,
    RunReport, StatusBus, StatusEvent,
};
use ocrpro_document::image::preview::{PREVIEW_SIZE, load_image, thumbnail};
use ocrpro_document::{Recognizer, export_to_dir, open_default_recognizer};
use ocrpro_pipeline::BackgroundWorker;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::input;

/// What the preview pane shows for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub name: String,
    pub text: String,
    /// Thumbnail dimensions after fitting into the preview box.
    pub thumbnail_size: (u32, u32),
}

/// Shared application services. Cheap to clone; all state is Arc-wrapped.
#[derive(Clone)]
pub struct AppServices {
    collection: Arc<Mutex<ImageCollection>>,
    worker: BackgroundWorker,
    status: StatusBus,
    config: Arc<Mutex<AppConfig>>,
    data_dir: PathBuf,
    output_dir: PathBuf,
}

impl AppServices {
    /// Build the services around `config`; nothing touches the disk yet.
    pub fn with_config(
        data_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        config: AppConfig,
    ) -> Self {
        let status = StatusBus::new();
        let data_dir = data_dir.into();
        let output_dir = output_dir.into();
        info!(
            data = %data_dir.display(),
            output = %output_dir.display(),
            "app services initialised"
        );
        Self {
            collection: Arc::new(Mutex::new(ImageCollection::new())),
            worker: BackgroundWorker::new(status.clone()),
            status,
            config: Arc::new(Mutex::new(config)),
            data_dir,
            output_dir,
        }
    }

    pub fn status(&self) -> &StatusBus {
        &self.status
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    // -- Configuration -------------------------------------------------------

    pub fn config(&self) -> AppConfig {
        self.config.lock().expect("config lock poisoned").clone()
    }

    /// Apply `edit` to the in-memory config, rejecting invalid results.
    pub fn update_config(&self, edit: impl FnOnce(&mut AppConfig)) -> Result<()> {
        let mut guard = self.config.lock().expect("config lock poisoned");
        let mut candidate = guard.clone();
        edit(&mut candidate);
        candidate.validate()?;
        *guard = candidate;
        Ok(())
    }

    /// Persist the current config into the data directory.
    pub fn save_config(&self) -> Result<PathBuf> {
        let config = self.config();
        persist_config(&self.data_dir, &config)?;
        let path = self.data_dir.join(CONFIG_FILE);
        info!(path = %path.display(), "configuration saved");
        Ok(path)
    }

    // -- Collection ----------------------------------------------------------

    /// Add images, skipping unsupported types and paths already present.
    ///
    /// Returns how many entries were added.
    pub fn add_images(&self, paths: impl IntoIterator<Item = PathBuf>) -> usize {
        let mut collection = self.collection.lock().expect("collection lock poisoned");
        let mut added = 0;
        for path in input::filter_supported(paths) {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            if collection.add(path) {
                added += 1;
                self.status.publish(StatusEvent::ImageAdded { name });
            }
        }
        added
    }

    /// Remove the entry at 0-based `index`.
    ///
    /// An out-of-range index publishes `RemoveFailed` and is returned as an error.
    pub fn remove_image(&self, index: usize) -> Result<ImageEntry> {
        let removed = self
            .collection
            .lock()
            .expect("collection lock poisoned")
            .remove(index);
        let removed = match removed {
            Ok(entry) => entry,
            Err(e) => {
                self.status.publish(StatusEvent::RemoveFailed {
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };
        self.status.publish(StatusEvent::ImageRemoved {
            name: removed.file_name(),
        });
        Ok(removed)
    }

    /// Swap the entry at 0-based `index` with its neighbour; false at a boundary.
    pub fn move_image(&self, index: usize, direction: MoveDirection) -> bool {
        self.collection
            .lock()
            .expect("collection lock poisoned")
            .move_entry(index, direction)
    }

    pub fn entries(&self) -> Vec<ImageEntry> {
        self.collection
            .lock()
            .expect("collection lock poisoned")
            .snapshot()
    }

    /// Text and thumbnail for the entry at 0-based `index`.
    pub fn preview(&self, index: usize) -> Result<Preview> {
        let entry = {
            let collection = self.collection.lock().expect("collection lock poisoned");
            let len = collection.len();
            collection
                .get(index)
                .cloned()
                .ok_or(OcrProError::IndexOutOfBounds { index, len })?
        };
        let image = load_image(entry.path())?;
        let thumb = thumbnail(&image, PREVIEW_SIZE);
        Ok(Preview {
            name: entry.file_name(),
            text: entry.text,
            thumbnail_size: (thumb.width(), thumb.height()),
        })
    }

    // -- Recognition ---------------------------------------------------------

    /// Load the engine compiled into this build, in the background.
    pub fn initialize_engine(&self) -> Result<JoinHandle<Result<()>>> {
        self.initialize_engine_with(open_default_recognizer)
    }

    /// Load the engine produced by `open`, in the background.
    pub fn initialize_engine_with<F>(&self, open: F) -> Result<JoinHandle<Result<()>>>
    where
        F: FnOnce(&EngineSettings) -> Result<Arc<dyn Recognizer>> + Send + 'static,
    {
        let settings = self.config().engine_settings();
        self.worker.initialize(settings, open)
    }

    /// Start OCR over the whole collection, in the background.
    pub fn process(&self) -> Result<JoinHandle<Result<RunReport>>> {
        self.worker.start_run(Arc::clone(&self.collection))
    }

    // -- Export --------------------------------------------------------------

    /// Write one export artifact into the output directory.
    ///
    /// Failures are reported on the status channel, never returned; `None`
    /// means nothing was written.
    pub fn export(&self, format: ExportFormat) -> Option<PathBuf> {
        let entries = self.entries();
        match export_to_dir(format, &entries, &self.output_dir) {
            Ok(path) => {
                self.status.publish(StatusEvent::Exported {
                    format,
                    path: path.clone(),
                });
                Some(path)
            }
            Err(OcrProError::NothingToExport) => {
                warn!(%format, "nothing to export");
                self.status.publish(StatusEvent::NothingToExport);
                None
            }
            Err(e) => {
                error!(%format, error = %e, "export failed");
                self.status.publish(StatusEvent::ExportFailed {
                    format,
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

// -- Config persistence helpers ----------------------------------------------

const CONFIG_FILE: &str = "config.json";

pub fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return None;
    }
    match AppConfig::load_from(&path) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    config.save_to(data_dir.join(CONFIG_FILE))
}
