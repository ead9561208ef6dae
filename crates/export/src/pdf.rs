//! Plain paginated PDF rendering.
//!
//! The PDF uses the built-in Helvetica family, which only covers Latin-1.
//! Text is wrapped by character count, so line breaks are approximate.

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use studybuddy_core::{AppError, AppResult};

use crate::artifact::ExportHeader;
use crate::classify::classify_lines;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.0;
const WRAP_CHARS: usize = 90;
const BODY_SIZE: f32 = 11.0;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.352_778;

/// Replace every character outside Latin-1 with `?`.
///
/// Returns the converted text and the number of replaced characters.
pub fn to_latin1_lossy(text: &str) -> (String, usize) {
    let mut replaced = 0;
    let converted = text
        .chars()
        .map(|c| {
            if (c as u32) <= 0xFF {
                c
            } else {
                replaced += 1;
                '?'
            }
        })
        .collect();
    (converted, replaced)
}

/// Render `text` as an A4 PDF with the given header block.
pub fn render_pdf(text: &str, header: &ExportHeader, date_line: &str) -> AppResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        header.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );

    let regular = builtin_font(&doc, BuiltinFont::Helvetica)?;
    let bold = builtin_font(&doc, BuiltinFont::HelveticaBold)?;
    let oblique = builtin_font(&doc, BuiltinFont::HelveticaOblique)?;

    let mut replaced = 0;
    let mut latin1 = |s: &str| {
        let (converted, count) = to_latin1_lossy(s);
        replaced += count;
        converted
    };

    let mut layer_ref = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN;

    let institution = latin1(&header.institution);
    layer_ref.use_text(institution.as_str(), 16.0, Mm(centered_x(&institution, 16.0)), Mm(y), &bold);
    y -= 8.0;

    let title = latin1(&header.title);
    layer_ref.use_text(title.as_str(), 14.0, Mm(centered_x(&title, 14.0)), Mm(y), &bold);
    y -= 8.0;

    let date = latin1(date_line);
    layer_ref.use_text(date.as_str(), 10.0, Mm(right_aligned_x(&date, 10.0)), Mm(y), &oblique);
    y -= 12.0;

    let mut pages = 1;
    for (_, line) in classify_lines(text) {
        for row in wrap_line(&latin1(line), WRAP_CHARS) {
            if y < MARGIN {
                let (next_page, next_layer) =
                    doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
                layer_ref = doc.get_page(next_page).get_layer(next_layer);
                y = PAGE_HEIGHT - MARGIN;
                pages += 1;
            }
            write_body(&layer_ref, &row, y, &regular);
            y -= LINE_HEIGHT;
        }
    }

    if replaced > 0 {
        tracing::warn!(
            replaced,
            "Characters outside Latin-1 were replaced with '?' in the PDF"
        );
    }

    let mut bytes = Vec::new();
    doc.save(&mut BufWriter::new(&mut bytes))
        .map_err(|e| AppError::Export(format!("Failed to write PDF: {}", e)))?;

    tracing::debug!(pages, bytes = bytes.len(), "PDF rendered");
    Ok(bytes)
}

fn builtin_font(
    doc: &printpdf::PdfDocumentReference,
    font: BuiltinFont,
) -> AppResult<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| AppError::Export(format!("Failed to load PDF font: {}", e)))
}

fn write_body(layer: &PdfLayerReference, row: &str, y: f32, font: &IndirectFontRef) {
    layer.use_text(row, BODY_SIZE, Mm(MARGIN), Mm(y), font);
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_EM * PT_TO_MM
}

fn centered_x(text: &str, size: f32) -> f32 {
    ((PAGE_WIDTH - text_width(text, size)) / 2.0).max(MARGIN)
}

fn right_aligned_x(text: &str, size: f32) -> f32 {
    (PAGE_WIDTH - MARGIN - text_width(text, size)).max(MARGIN)
}

/// Greedy word wrap by character count. Words longer than `width` are split.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len > width {
            rows.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len > width {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(width) {
                if current_len > 0 {
                    rows.push(std::mem::take(&mut current));
                }
                current = piece.iter().collect();
                current_len = piece.len();
            }
            continue;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if current_len > 0 {
        rows.push(current);
    }
    rows
}
