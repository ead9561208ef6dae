//! Question-paper export for Study Buddy.
//!
//! This crate renders generated question-paper text into:
//! - A plain paginated PDF (printpdf, built-in Helvetica)
//! - A styled DOCX (docx-rs) with headings, numbered questions and sub-parts

pub mod artifact;
pub mod classify;
pub mod docx;
pub mod pdf;

// Re-export main types
pub use artifact::{
    export_question_paper, render_question_paper, write_artifact, write_paper, ExportArtifact,
    ExportHeader, RenderedPaper, DOCX_MIME, PDF_MIME,
};
pub use classify::{classify_line, classify_lines, LineStyle};
pub use docx::render_docx;
pub use pdf::{render_pdf, to_latin1_lossy};
