//! Styled DOCX rendering.

use std::io::Cursor;

use docx_rs::{AlignmentType, Docx, LineSpacing, PageMargin, Paragraph, Run};
use studybuddy_core::{AppError, AppResult};

use crate::artifact::ExportHeader;
use crate::classify::{classify_lines, LineStyle};

/// One inch in twentieths of a point.
const INCH: i32 = 1440;
const HEADER_BLUE: &str = "007AFF";
const MUTED_GREY: &str = "808080";

/// Run sizes are in half-points.
fn pt(size: usize) -> usize {
    size * 2
}

/// Render `text` as a DOCX document with header, styled body and footer.
pub fn render_docx(text: &str, header: &ExportHeader, date_line: &str) -> AppResult<Vec<u8>> {
    let mut docx = Docx::new().page_margin(
        PageMargin::new()
            .top(INCH)
            .bottom(INCH)
            .left(INCH)
            .right(INCH),
    );

    docx = docx
        .add_paragraph(
            Paragraph::new()
                .add_run(
                    Run::new()
                        .add_text(header.institution.as_str())
                        .size(pt(18))
                        .bold()
                        .color(HEADER_BLUE),
                )
                .align(AlignmentType::Center),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(header.title.as_str()).size(pt(16)).bold())
                .align(AlignmentType::Center),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(
                    Run::new()
                        .add_text(date_line)
                        .size(pt(10))
                        .italic()
                        .color(MUTED_GREY),
                )
                .align(AlignmentType::Right),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("_".repeat(80))));

    for (style, line) in classify_lines(text) {
        docx = docx.add_paragraph(styled_paragraph(style, line));
    }

    docx = docx.add_paragraph(Paragraph::new()).add_paragraph(
        Paragraph::new()
            .add_run(
                Run::new()
                    .add_text(header.footer.as_str())
                    .size(pt(9))
                    .italic()
                    .color(MUTED_GREY),
            )
            .align(AlignmentType::Center),
    );

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| AppError::Export(format!("Failed to write DOCX: {}", e)))?;

    Ok(cursor.into_inner())
}

fn styled_paragraph(style: LineStyle, line: &str) -> Paragraph {
    match style {
        LineStyle::Heading => Paragraph::new()
            .add_run(Run::new().add_text(line).size(pt(14)).bold())
            .align(AlignmentType::Left),
        LineStyle::Numbered => Paragraph::new()
            .add_run(Run::new().add_text(line).size(pt(12)).bold())
            .line_spacing(LineSpacing::new().before(120).after(60)),
        LineStyle::SubPart => Paragraph::new()
            .add_run(Run::new().add_text(line).size(pt(11)))
            .indent(Some(INCH / 2), None, None, None),
        LineStyle::Body => Paragraph::new().add_run(Run::new().add_text(line).size(pt(11))),
    }
}
