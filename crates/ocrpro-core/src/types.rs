// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for OCR Pro.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image file extensions accepted from the file dialog or the command line.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "webp"];

/// Prefix of the text stored into an entry whose processing failed.
pub const ERROR_MARKER: &str = "Error:";

/// Whether `path` carries one of the [`SUPPORTED_EXTENSIONS`] (case-insensitive).
pub fn is_supported_image(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Stable identifier for an image entry, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One image in the collection plus its (possibly empty) extracted text.
///
/// Position in the collection is implicit; the path never changes after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub id: EntryId,
    path: PathBuf,
    /// Empty means "not processed yet" or "nothing recognised".
    pub text: String,
}

impl ImageEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: EntryId::new(),
            path: path.into(),
            text: String::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name (final path component), falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    /// Whether the stored text is a per-item failure marker.
    pub fn is_failed(&self) -> bool {
        self.text.starts_with(ERROR_MARKER)
    }
}

/// Direction of a single-step reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Towards the front (swap with the predecessor).
    Up,
    /// Towards the back (swap with the successor).
    Down,
}

/// Output artifact kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Flat UTF-8 text file.
    Text,
    /// Paginated PDF document.
    Pdf,
}

impl ExportFormat {
    /// Fixed file name written into the output directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Text => "ocr_output.txt",
            Self::Pdf => "ocr_output.pdf",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "TXT"),
            Self::Pdf => write!(f, "PDF"),
        }
    }
}

/// Result of processing a single entry during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOutcome {
    /// Newline-joined recognised text (may be empty).
    Recognized(String),
    /// Decode, preprocessing, or recognition failed with this description.
    Failed(String),
}

impl ItemOutcome {
    /// Text to store into the entry: the recognised text or an error marker.
    pub fn entry_text(&self) -> String {
        match self {
            Self::Recognized(text) => text.clone(),
            Self::Failed(reason) => format!("{ERROR_MARKER} could not process image - {reason}"),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome for one entry of a run snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub id: EntryId,
    /// 1-based position within the run snapshot.
    pub position: usize,
    pub outcome: ItemOutcome,
}

/// Everything a completed run produced, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub results: Vec<ItemResult>,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failure()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert!(is_supported_image("/tmp/a.PNG"));
        assert!(is_supported_image("scan.jpeg"));
        assert!(is_supported_image("page.Tiff"));
        assert!(is_supported_image("photo.webp"));
        assert!(!is_supported_image("notes.txt"));
        assert!(!is_supported_image("scan.tif"));
        assert!(!is_supported_image("no_extension"));
    }

    #[test]
    fn file_name_uses_last_component() {
        let entry = ImageEntry::new("/data/scans/page-01.png");
        assert_eq!(entry.file_name(), "page-01.png");
        assert!(!entry.has_text());
    }

    #[test]
    fn failed_outcome_produces_error_marker() {
        let outcome = ItemOutcome::Failed("bad header".into());
        let text = outcome.entry_text();
        assert!(text.starts_with(ERROR_MARKER));
        assert!(text.contains("bad header"));
    }

    #[test]
    fn run_report_counts_failures() {
        let report = RunReport {
            results: vec![
                ItemResult {
                    id: EntryId::new(),
                    position: 1,
                    outcome: ItemOutcome::Recognized("hello".into()),
                },
                ItemResult {
                    id: EntryId::new(),
                    position: 2,
                    outcome: ItemOutcome::Failed("corrupt".into()),
                },
            ],
        };
        assert_eq!(report.processed(), 2);
        assert_eq!(report.failed(), 1);
    }
}
