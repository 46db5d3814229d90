// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export serializers — flat text and paginated PDF.
//
// Both read the collection's entries in order and skip entries whose text is
// empty. Positions in headers are 1-based positions in the full collection,
// so skipped entries leave gaps in the numbering.

pub mod pdf;
pub mod text;

use std::path::{Path, PathBuf};

use ocrpro_core::error::{OcrProError, Result};
use ocrpro_core::{ExportFormat, ImageEntry};

pub use pdf::PaginatedWriter;

/// Entries with text, paired with their 1-based collection position.
pub fn exportable(entries: &[ImageEntry]) -> impl Iterator<Item = (usize, &ImageEntry)> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.has_text())
        .map(|(index, entry)| (index + 1, entry))
}

/// Fail with [`OcrProError::NothingToExport`] unless some entry has text.
pub fn ensure_exportable(entries: &[ImageEntry]) -> Result<()> {
    if exportable(entries).next().is_none() {
        return Err(OcrProError::NothingToExport);
    }
    Ok(())
}

/// Write `format` into `output_dir` under its fixed file name, replacing any
/// previous artifact. Returns the written path.
pub fn export_to_dir(
    format: ExportFormat,
    entries: &[ImageEntry],
    output_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let path = output_dir.as_ref().join(format.file_name());
    match format {
        ExportFormat::Text => text::write_to_file(entries, &path)?,
        ExportFormat::Pdf => PaginatedWriter::new().write_to_file(entries, &path)?,
    }
    Ok(path)
}
