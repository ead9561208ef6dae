//! Document loading.
//!
//! Turns user-supplied paths into [`Document`]s. PDFs are read one page at a
//! time; plain text files become a single document. A file that cannot be
//! read is recorded as a failure and the rest of the batch continues.

use std::fs;
use std::panic;
use std::path::{Path, PathBuf};

use serde::Serialize;
use studybuddy_core::{AppError, AppResult};
use walkdir::WalkDir;

/// Raw text extracted from one uploaded file, or one page of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub raw_text: String,
    pub source_name: String,
    /// 1-based page number for PDF pages
    pub page: Option<u32>,
}

/// A file that could not be turned into documents.
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    pub source_name: String,
    pub path: PathBuf,
    pub message: String,
}

impl LoadFailure {
    fn from_error(path: &Path, err: AppError) -> Self {
        let message = match err {
            AppError::DocumentLoad { message, .. } => message,
            other => other.to_string(),
        };
        Self {
            source_name: source_name(path),
            path: path.to_path_buf(),
            message,
        }
    }
}

/// Outcome of loading a batch of paths.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub documents: Vec<Document>,
    pub failures: Vec<LoadFailure>,
    /// Names of files that produced at least one document
    pub loaded_files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Pdf,
    Text,
}

impl FileKind {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Load every file named by `paths`.
///
/// Directories are walked recursively in file-name order and only `.pdf`
/// and `.txt` files inside them are considered. Files named directly are
/// always attempted: anything that is not a PDF is decoded as UTF-8 text.
pub fn load_paths(paths: &[PathBuf]) -> LoadReport {
    let mut report = LoadReport::default();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
            {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!("Skipping unreadable entry under {:?}: {}", path, e);
                        continue;
                    }
                };

                let entry_path = entry.path();
                if !entry.file_type().is_file() {
                    continue;
                }
                match FileKind::from_path(entry_path) {
                    Some(kind) => load_into(&mut report, entry_path, kind),
                    None => tracing::debug!("Skipping unsupported file {:?}", entry_path),
                }
            }
        } else {
            let kind = FileKind::from_path(path).unwrap_or(FileKind::Text);
            load_into(&mut report, path, kind);
        }
    }

    tracing::info!(
        documents = report.documents.len(),
        files = report.loaded_files.len(),
        failures = report.failures.len(),
        "Loaded documents"
    );

    report
}

fn load_into(report: &mut LoadReport, path: &Path, kind: FileKind) {
    match load_file_as(path, kind) {
        Ok(documents) => {
            report.loaded_files.push(source_name(path));
            report.documents.extend(documents);
        }
        Err(err) => {
            tracing::warn!("{}", err);
            report.failures.push(LoadFailure::from_error(path, err));
        }
    }
}

/// Load a single file into one or more documents.
///
/// The kind is taken from the extension; anything that is not a PDF is
/// decoded as UTF-8 text.
pub fn load_file(path: &Path) -> AppResult<Vec<Document>> {
    load_file_as(path, FileKind::from_path(path).unwrap_or(FileKind::Text))
}

fn load_file_as(path: &Path, kind: FileKind) -> AppResult<Vec<Document>> {
    let name = source_name(path);
    let bytes = fs::read(path).map_err(|e| AppError::document_load(&name, e.to_string()))?;

    let documents = match kind {
        FileKind::Pdf => load_pdf(&name, &bytes)?,
        FileKind::Text => vec![load_text(&name, path, bytes)?],
    };

    tracing::debug!("Loaded {} ({} documents)", name, documents.len());
    Ok(documents)
}

fn load_text(name: &str, path: &Path, bytes: Vec<u8>) -> AppResult<Document> {
    let text = String::from_utf8(bytes).map_err(|_| unsupported_binary(name, path))?;
    if text.contains('\0') {
        return Err(unsupported_binary(name, path));
    }

    Ok(Document {
        raw_text: text,
        source_name: name.to_string(),
        page: None,
    })
}

fn unsupported_binary(name: &str, path: &Path) -> AppError {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| "no extension".to_string());
    AppError::document_load(
        name,
        format!("unsupported file type ({}): not a PDF or UTF-8 text file", ext),
    )
}

fn load_pdf(name: &str, bytes: &[u8]) -> AppResult<Vec<Document>> {
    let pages = match extract_pdf_pages(bytes) {
        Ok(pages) => pages,
        Err(e) => {
            tracing::debug!("Per-page extraction failed for {}: {}", name, e);
            Vec::new()
        }
    };

    if !pages.is_empty() {
        return Ok(pages
            .into_iter()
            .map(|(page, raw_text)| Document {
                raw_text,
                source_name: name.to_string(),
                page: Some(page),
            })
            .collect());
    }

    tracing::debug!("Falling back to whole-document extraction for {}", name);

    // pdf-extract panics on some malformed fonts
    let text = match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(AppError::document_load(
                name,
                format!("failed to extract PDF text: {}", e),
            ))
        }
        Err(_) => {
            return Err(AppError::document_load(
                name,
                "failed to extract PDF text: extractor crashed",
            ))
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::document_load(
            name,
            "no extractable text (the PDF may be scanned images)",
        ));
    }

    Ok(vec![Document {
        raw_text: text,
        source_name: name.to_string(),
        page: None,
    }])
}

/// Page number and text for every page that has any.
fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<(u32, String)>, lopdf::Error> {
    let doc = lopdf::Document::load_mem(bytes)?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => pages.push((*page_number, text)),
            Ok(_) => tracing::debug!("Page {} has no text", page_number),
            Err(e) => tracing::debug!("Could not extract page {}: {}", page_number, e),
        }
    }

    Ok(pages)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
