// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flat text export.
//
// Layout per exported entry:
//
// ```text
// === Image <position>: <file name> ===
// <text>
// <blank line>
// ```

use std::fmt::Write as _;
use std::path::Path;

use ocrpro_core::ImageEntry;
use ocrpro_core::error::Result;
use tracing::{info, instrument};

use super::{ensure_exportable, exportable};

/// Header line identifying an entry by 1-based position and file name.
pub fn header(position: usize, entry: &ImageEntry) -> String {
    format!("=== Image {position}: {} ===", entry.file_name())
}

/// Render every entry with text into one UTF-8 document.
pub fn render(entries: &[ImageEntry]) -> Result<String> {
    ensure_exportable(entries)?;
    let mut out = String::new();
    for (position, entry) in exportable(entries) {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", header(position, entry));
        out.push_str(&entry.text);
        out.push_str("\n\n");
    }
    Ok(out)
}

/// Render and write to `path`, truncating any existing file.
#[instrument(skip(entries), fields(path = %path.as_ref().display(), entries = entries.len()))]
pub fn write_to_file(entries: &[ImageEntry], path: impl AsRef<Path>) -> Result<()> {
    let rendered = render(entries)?;
    std::fs::write(path.as_ref(), rendered.as_bytes())?;
    info!(bytes = rendered.len(), "Wrote text export to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrpro_core::OcrProError;

    fn entries_with(texts: &[&str]) -> Vec<ImageEntry> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let mut entry = ImageEntry::new(format!("/scans/page-{}.png", i + 1));
                entry.text = (*text).to_string();
                entry
            })
            .collect()
    }

    #[test]
    fn only_entries_with_text_are_written_in_order() {
        let entries = entries_with(&["first page", "", "third\npage"]);
        let out = render(&entries).expect("render");

        assert_eq!(
            out,
            "=== Image 1: page-1.png ===\nfirst page\n\n\
             === Image 3: page-3.png ===\nthird\npage\n\n"
        );
        assert_eq!(out.matches("=== Image").count(), 2);
        assert!(!out.contains("Image 2"));
    }

    #[test]
    fn all_empty_is_nothing_to_export() {
        let entries = entries_with(&["", ""]);
        assert!(matches!(render(&entries), Err(OcrProError::NothingToExport)));
    }

    #[test]
    fn rewriting_replaces_previous_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ocr_output.txt");

        let mut entries = entries_with(&["a much longer first recognition result", "second"]);
        write_to_file(&entries, &path).expect("first export");

        entries[0].text = "short".into();
        entries[1].text.clear();
        write_to_file(&entries, &path).expect("second export");

        let content = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(content, "=== Image 1: page-1.png ===\nshort\n\n");
    }

    #[test]
    fn failed_entries_are_exported_with_their_marker() {
        let entries = entries_with(&["Error: could not process image - corrupt"]);
        let out = render(&entries).expect("render");
        assert!(out.contains("Error: could not process image"));
    }
}
