//! Export artifacts and writing them to disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use studybuddy_core::config::ExportConfig;
use studybuddy_core::{AppError, AppResult};
use tempfile::NamedTempFile;

use crate::docx::render_docx;
use crate::pdf::render_pdf;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Fixed text placed around the question paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportHeader {
    pub institution: String,
    pub title: String,
    pub footer: String,
}

impl Default for ExportHeader {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for ExportHeader {
    fn from(config: &ExportConfig) -> Self {
        Self {
            institution: config.institution.clone(),
            title: config.title.clone(),
            footer: config.footer.clone(),
        }
    }
}

/// A rendered document ready to be saved or offered for download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// The PDF and DOCX renderings of one question paper.
#[derive(Debug, Clone)]
pub struct RenderedPaper {
    pub pdf: ExportArtifact,
    pub docx: ExportArtifact,
}

impl RenderedPaper {
    pub fn artifacts(&self) -> [&ExportArtifact; 2] {
        [&self.pdf, &self.docx]
    }
}

/// Render both formats. File names share the timestamp of `generated_at`.
pub fn render_question_paper(
    text: &str,
    header: &ExportHeader,
    generated_at: DateTime<Local>,
) -> AppResult<RenderedPaper> {
    let date_line = format!("Generated on: {}", generated_at.format("%B %d, %Y"));
    let stem = format!("question_paper_{}", generated_at.format("%Y%m%d_%H%M%S"));

    let pdf = ExportArtifact {
        file_name: format!("{}.pdf", stem),
        mime: PDF_MIME,
        bytes: render_pdf(text, header, &date_line)?,
    };
    let docx = ExportArtifact {
        file_name: format!("{}.docx", stem),
        mime: DOCX_MIME,
        bytes: render_docx(text, header, &date_line)?,
    };

    Ok(RenderedPaper { pdf, docx })
}

/// Write `artifact` into `dir` via a temporary file that is persisted
/// under the final name. The temporary file is removed on failure.
pub fn write_artifact(dir: &Path, artifact: &ExportArtifact) -> AppResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&artifact.bytes)?;
    tmp.flush()?;

    let target = dir.join(&artifact.file_name);
    tmp.persist(&target).map_err(|e| AppError::Io(e.error))?;

    tracing::debug!(path = %target.display(), mime = artifact.mime, "Artifact written");
    Ok(target)
}

/// Render `text` in both formats and write them into `dir`.
pub fn export_question_paper(
    text: &str,
    header: &ExportHeader,
    dir: &Path,
) -> AppResult<Vec<PathBuf>> {
    let paper = render_question_paper(text, header, Local::now())?;
    let written = write_paper(dir, &paper)?;

    tracing::info!(dir = %dir.display(), files = written.len(), "Question paper exported");
    Ok(written)
}

/// Write both artifacts of `paper` into `dir`, or neither: files already
/// written are removed when a later one fails.
pub fn write_paper(dir: &Path, paper: &RenderedPaper) -> AppResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(2);
    for artifact in paper.artifacts() {
        match write_artifact(dir, artifact) {
            Ok(path) => written.push(path),
            Err(err) => {
                for path in &written {
                    if let Err(e) = fs::remove_file(path) {
                        tracing::warn!("Could not remove partial export {:?}: {}", path, e);
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const PAPER: &str = "SECTION A\n1. Define mutex.\na) two marks\nThis topic covers...";

    #[test]
    fn test_file_names_share_timestamp() {
        let at = Local.with_ymd_and_hms(2025, 3, 1, 14, 5, 9).unwrap();
        let paper = render_question_paper(PAPER, &ExportHeader::default(), at).unwrap();

        assert_eq!(paper.pdf.file_name, "question_paper_20250301_140509.pdf");
        assert_eq!(paper.docx.file_name, "question_paper_20250301_140509.docx");
        assert_eq!(paper.pdf.mime, PDF_MIME);
        assert_eq!(paper.docx.mime, DOCX_MIME);
        assert!(paper.pdf.bytes.starts_with(b"%PDF"));
        assert!(paper.docx.bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_header_from_config() {
        let config = ExportConfig {
            institution: "Example University".to_string(),
            ..ExportConfig::default()
        };
        let header = ExportHeader::from(&config);
        assert_eq!(header.institution, "Example University");
        assert_eq!(header.title, "Question Paper");
        assert_eq!(header.footer, "Generated by Study-Buddy AI Assistant");
    }

    #[test]
    fn test_export_writes_only_final_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("exports");

        let written = export_question_paper(PAPER, &ExportHeader::default(), &out).unwrap();

        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));

        let mut names: Vec<String> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2, "temporary files must not be left behind");
        assert!(names[0].ends_with(".docx"));
        assert!(names[1].ends_with(".pdf"));
    }

    #[test]
    fn test_failed_docx_removes_written_pdf() {
        let dir = TempDir::new().unwrap();
        let at = Local.with_ymd_and_hms(2025, 3, 1, 14, 5, 9).unwrap();
        let paper = render_question_paper(PAPER, &ExportHeader::default(), at).unwrap();

        // A directory squatting on the DOCX name makes its write fail.
        fs::create_dir(dir.path().join(&paper.docx.file_name)).unwrap();

        let result = write_paper(dir.path(), &paper);
        assert!(matches!(result, Err(AppError::Io(_))));

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![paper.docx.file_name.clone()]);
    }
}
