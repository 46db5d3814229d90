// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordered image collection — insertion-ordered, unique by path, reordered by
// single-step swaps. This is the single source of ordering for both the batch
// pipeline and the exporters.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{OcrProError, Result};
use crate::types::{EntryId, ImageEntry, MoveDirection, RunReport};

/// The ordered sequence of images the user has collected.
///
/// Position in the underlying `Vec` *is* the entry's order, so order values
/// are always a gapless total order matching list position.
#[derive(Debug, Clone, Default)]
pub struct ImageCollection {
    entries: Vec<ImageEntry>,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` with empty text unless it is already present.
    ///
    /// Returns `true` if a new entry was appended.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            debug!(path = %path.display(), "image already in collection");
            return false;
        }
        debug!(path = %path.display(), position = self.entries.len() + 1, "image added");
        self.entries.push(ImageEntry::new(path));
        true
    }

    /// Delete the entry at `index`, shifting later entries down by one.
    pub fn remove(&mut self, index: usize) -> Result<ImageEntry> {
        if index >= self.entries.len() {
            return Err(OcrProError::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        debug!(path = %removed.path().display(), index, "image removed");
        Ok(removed)
    }

    /// Swap the entry at `index` with its neighbour in `direction`.
    ///
    /// Moves that would leave the collection bounds (including an `index`
    /// that does not exist) are no-ops. Returns `true` if a swap happened.
    pub fn move_entry(&mut self, index: usize, direction: MoveDirection) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.entries.len() => index + 1,
            _ => return false,
        };
        self.entries.swap(index, target);
        true
    }

    /// Entries in current order.
    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    /// Owned copy of the current entries, handed to a background run.
    pub fn snapshot(&self) -> Vec<ImageEntry> {
        self.entries.clone()
    }

    pub fn get(&self, index: usize) -> Option<&ImageEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|entry| entry.path() == path)
    }

    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Whether any entry carries non-empty text.
    pub fn has_text(&self) -> bool {
        self.entries.iter().any(ImageEntry::has_text)
    }

    /// Write a run's outcomes back by entry id.
    ///
    /// Entries removed while the run was in flight are skipped. Returns how
    /// many entries were updated.
    pub fn apply_results(&mut self, report: &RunReport) -> usize {
        let mut applied = 0;
        for result in &report.results {
            match self.entries.iter_mut().find(|entry| entry.id == result.id) {
                Some(entry) => {
                    entry.text = result.outcome.entry_text();
                    applied += 1;
                }
                None => {
                    warn!(id = %result.id, "entry removed during run; result dropped");
                }
            }
        }
        applied
    }
}
