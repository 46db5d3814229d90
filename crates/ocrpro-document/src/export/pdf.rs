// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paginated PDF export using `printpdf` 0.8.
//
// Layout is computed first as plain data (`PageLayout`), then serialised:
// printpdf 0.8 builds documents from `PdfPage` structs holding `Vec<Op>`
// operation lists, written out via `PdfDocument::save()`.
//
// Geometry (PDF points, origin bottom-left, US Letter):
//
// - the cursor starts 50pt below the top edge;
// - an entry header is drawn at x = 50 and moves the cursor down 30pt;
// - each body line is drawn at x = 70, truncated to 80 characters, and moves
//   the cursor down 15pt;
// - 20pt of extra space follows each entry;
// - whenever the cursor is below the 50pt bottom margin, the next line starts
//   a new page. Text is never wrapped.
//
// printpdf writes builtin-font strings as raw UTF-8 while the font declares
// /WinAnsiEncoding, so the rendered bytes pass through `lopdf` once more to
// re-encode every shown string. Characters outside WinAnsi become `?`.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use ocrpro_core::ImageEntry;
use ocrpro_core::error::{OcrProError, Result};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, info, instrument};

use super::{ensure_exportable, exportable};

/// US Letter, in points and millimetres.
const PAGE_HEIGHT_PT: f32 = 792.0;
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;

/// Top and bottom margin.
pub const MARGIN_PT: f32 = 50.0;
const HEADER_X_PT: f32 = 50.0;
const BODY_X_PT: f32 = 70.0;
const HEADER_ADVANCE_PT: f32 = 30.0;
/// Vertical distance between body lines.
pub const LINE_PITCH_PT: f32 = 15.0;
const ENTRY_GAP_PT: f32 = 20.0;
const FONT_SIZE_PT: f32 = 12.0;
/// Body lines longer than this are truncated.
pub const MAX_LINE_CHARS: usize = 80;

/// A line of text at a fixed position on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    /// Baseline, measured up from the bottom edge.
    pub y: f32,
    pub text: String,
}

/// Everything drawn on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// Vertical cursor that breaks pages at the bottom margin.
struct Cursor {
    pages: Vec<PageLayout>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![PageLayout::default()],
            y: PAGE_HEIGHT_PT - MARGIN_PT,
        }
    }

    fn place(&mut self, x: f32, text: String, advance: f32) {
        if self.y < MARGIN_PT {
            self.pages.push(PageLayout::default());
            self.y = PAGE_HEIGHT_PT - MARGIN_PT;
        }
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PlacedLine { x, y: self.y, text });
        }
        self.y -= advance;
    }

    fn skip(&mut self, amount: f32) {
        self.y -= amount;
    }
}

/// Truncate to [`MAX_LINE_CHARS`] characters (not bytes).
fn truncate_line(line: &str) -> String {
    line.chars().take(MAX_LINE_CHARS).collect()
}

/// Writes the collection's extracted text as a paginated PDF.
pub struct PaginatedWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

impl PaginatedWriter {
    pub fn new() -> Self {
        Self {
            title: "OCR Pro Export".into(),
        }
    }

    /// Compute page layout for every entry with text.
    pub fn layout(&self, entries: &[ImageEntry]) -> Result<Vec<PageLayout>> {
        ensure_exportable(entries)?;
        let mut cursor = Cursor::new();

        for (position, entry) in exportable(entries) {
            let header = format!("Image {position}: {}", entry.file_name());
            cursor.place(HEADER_X_PT, header, HEADER_ADVANCE_PT);

            for line in entry.text.split('\n') {
                cursor.place(BODY_X_PT, truncate_line(line), LINE_PITCH_PT);
            }
            cursor.skip(ENTRY_GAP_PT);
        }

        Ok(cursor.pages)
    }

    /// Lay out and serialise to PDF bytes.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub fn render(&self, entries: &[ImageEntry]) -> Result<Vec<u8>> {
        let layout = self.layout(entries)?;
        let page_w = Mm(PAGE_WIDTH_MM);
        let page_h = Mm(PAGE_HEIGHT_MM);

        let pages: Vec<PdfPage> = layout
            .iter()
            .map(|page| {
                let mut ops: Vec<Op> = Vec::with_capacity(page.lines.len() * 5);
                for line in &page.lines {
                    ops.push(Op::StartTextSection);
                    ops.push(Op::SetTextCursor {
                        pos: Point {
                            x: Pt(line.x),
                            y: Pt(line.y),
                        },
                    });
                    ops.push(Op::SetFontSizeBuiltinFont {
                        size: Pt(FONT_SIZE_PT),
                        font: BuiltinFont::Helvetica,
                    });
                    ops.push(Op::WriteTextBuiltinFont {
                        items: vec![TextItem::Text(line.text.clone())],
                        font: BuiltinFont::Helvetica,
                    });
                    ops.push(Op::EndTextSection);
                }
                PdfPage::new(page_w, page_h, ops)
            })
            .collect();

        let mut doc = PdfDocument::new(&self.title);
        doc.with_pages(pages);

        debug!(pages = layout.len(), "PDF layout complete");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }
        reencode_win_ansi(&output)
    }

    /// Render and write to `path`, replacing any existing file.
    pub fn write_to_file(&self, entries: &[ImageEntry], path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.render(entries)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(bytes = bytes.len(), "Wrote PDF export to {}", path.as_ref().display());
        Ok(())
    }
}

/// Rewrite the `Tj`/`TJ` strings of every page from UTF-8 to WinAnsi.
fn reencode_win_ansi(pdf: &[u8]) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(pdf).map_err(pdf_error)?;
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let mut content: Content = doc.get_and_decode_page_content(page_id).map_err(pdf_error)?;
        for operation in &mut content.operations {
            match operation.operator.as_str() {
                "Tj" => operation.operands.iter_mut().for_each(reencode_string),
                "TJ" => {
                    for operand in &mut operation.operands {
                        if let Object::Array(items) = operand {
                            items.iter_mut().for_each(reencode_string);
                        }
                    }
                }
                _ => {}
            }
        }
        let encoded = content.encode().map_err(pdf_error)?;
        doc.change_page_content(page_id, encoded).map_err(pdf_error)?;
    }

    let mut output = Vec::with_capacity(pdf.len());
    doc.save_to(&mut output).map_err(|e| pdf_error(e.into()))?;
    Ok(output)
}

fn reencode_string(object: &mut Object) {
    if let Object::String(bytes, _) = object {
        let text = String::from_utf8_lossy(bytes);
        *bytes = text.chars().map(win_ansi_byte).collect();
    }
}

/// The WinAnsi (Windows-1252) code for `c`, or `?` when it has none.
fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

fn pdf_error(e: lopdf::Error) -> OcrProError {
    OcrProError::PdfError(e.to_string())
}

impl Default for PaginatedWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, text: &str) -> ImageEntry {
        let mut entry = ImageEntry::new(name);
        entry.text = text.to_string();
        entry
    }

    fn numbered_lines(count: usize) -> String {
        (1..=count)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn long_entry_spans_pages_and_respects_bottom_margin() {
        let entries = vec![entry("long.png", &numbered_lines(200))];
        let pages = PaginatedWriter::new().layout(&entries).expect("layout");

        assert!(pages.len() > 1, "200 lines must not fit on one page");
        for page in &pages {
            let last = page.lines.last().expect("no empty pages");
            assert!(last.y >= MARGIN_PT, "line below margin: {}", last.y);
            assert!(page.lines.iter().all(|l| l.y <= PAGE_HEIGHT_PT - MARGIN_PT));
        }
        let total: usize = pages.iter().map(|p| p.lines.len()).sum();
        assert_eq!(total, 201);
    }

    #[test]
    fn first_page_geometry_follows_fixed_pitch() {
        let entries = vec![entry("a.png", "one\ntwo")];
        let pages = PaginatedWriter::new().layout(&entries).expect("layout");
        let lines = &pages[0].lines;

        assert_eq!(lines[0], PlacedLine { x: 50.0, y: 742.0, text: "Image 1: a.png".into() });
        assert_eq!(lines[1], PlacedLine { x: 70.0, y: 712.0, text: "one".into() });
        assert_eq!(lines[2], PlacedLine { x: 70.0, y: 697.0, text: "two".into() });
    }

    #[test]
    fn entries_are_separated_and_empty_ones_skipped() {
        let entries = vec![
            entry("a.png", "one"),
            entry("b.png", ""),
            entry("c.png", "three"),
        ];
        let pages = PaginatedWriter::new().layout(&entries).expect("layout");
        let lines = &pages[0].lines;

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2].text, "Image 3: c.png");
        // 712 - 15 (line) - 20 (gap) = 677
        assert_eq!(lines[2].y, 677.0);
    }

    #[test]
    fn long_lines_are_truncated_not_wrapped() {
        let long = "é".repeat(120);
        let entries = vec![entry("wide.png", &long)];
        let pages = PaginatedWriter::new().layout(&entries).expect("layout");

        assert_eq!(pages[0].lines.len(), 2);
        assert_eq!(pages[0].lines[1].text.chars().count(), MAX_LINE_CHARS);
    }

    #[test]
    fn nothing_to_export_without_text() {
        let entries = vec![entry("a.png", "")];
        assert!(matches!(
            PaginatedWriter::new().render(&entries),
            Err(OcrProError::NothingToExport)
        ));
    }

    #[test]
    fn written_pdf_has_one_page_per_layout_page() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ocr_output.pdf");
        let entries = vec![entry("long.png", &numbered_lines(200))];

        let writer = PaginatedWriter::new();
        let expected_pages = writer.layout(&entries).expect("layout").len();
        writer.write_to_file(&entries, &path).expect("write");

        let bytes = std::fs::read(&path).expect("read back");
        assert!(bytes.starts_with(b"%PDF"));
        let doc = lopdf::Document::load_mem(&bytes).expect("parse PDF");
        assert_eq!(doc.get_pages().len(), expected_pages);
    }

    #[test]
    fn accented_text_reads_back_intact() {
        let entries = vec![entry("año.png", "Año señal canción\nprecio 5€ «bien»")];
        let bytes = PaginatedWriter::new().render(&entries).expect("render");

        let doc = Document::load_mem(&bytes).expect("parse PDF");
        let text = doc.extract_text(&[1]).expect("extract text");
        assert!(text.contains("Image 1: año.png"), "got {text:?}");
        assert!(text.contains("señal"), "got {text:?}");
        assert!(text.contains("canción"), "got {text:?}");
        assert!(text.contains("5€ «bien»"), "got {text:?}");
        assert!(!text.contains('Ã'));
    }

    #[test]
    fn characters_outside_win_ansi_become_question_marks() {
        assert_eq!(win_ansi_byte('ñ'), 0xF1);
        assert_eq!(win_ansi_byte('—'), 0x97);
        assert_eq!(win_ansi_byte('A'), b'A');
        assert_eq!(win_ansi_byte('漢'), b'?');
        assert_eq!(win_ansi_byte('\t'), b'?');
    }

    #[test]
    fn shorter_export_replaces_longer_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ocr_output.pdf");
        let writer = PaginatedWriter::new();

        writer
            .write_to_file(&[entry("long.png", &numbered_lines(200))], &path)
            .expect("write long");
        let long = Document::load(&path).expect("parse long PDF");
        assert!(long.get_pages().len() > 1);

        writer
            .write_to_file(&[entry("short.png", "only line")], &path)
            .expect("write short");
        let short = Document::load(&path).expect("parse short PDF");
        assert_eq!(short.get_pages().len(), 1);
        let text = short.extract_text(&[1]).expect("extract text");
        assert!(text.contains("only line"));
        assert!(!text.contains("line 200"));
    }
}
