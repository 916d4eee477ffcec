pub mod chunker;
mod cleanup;
mod filters;
mod pdf;
mod segment;
mod txt;

use std::path::Path;

use thiserror::Error;

pub use cleanup::{cleanup_page_text, normalize_whitespace};
pub use filters::{is_outline_segment, looks_like_outline_list, OUTLINE_PREFIXES};
pub use segment::{segment_text, SegmentOptions};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A page of extracted text.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based page number (for PDFs). For TXT/MD, always 1.
    pub page_number: usize,
    /// Page text after cleanup.
    pub text: String,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Original filename.
    pub filename: String,
    /// File type: "pdf", "txt", "md"
    pub file_type: String,
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    /// Pages joined by a blank line, the way the chunker expects paragraphs.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Total character count across all pages.
    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

/// Extract text from file bytes based on the filename's extension.
///
/// `footer_patterns` are substrings identifying running header/footer lines
/// that are dropped from PDF pages.
pub fn extract_text(
    bytes: &[u8],
    filename: &str,
    footer_patterns: &[String],
) -> Result<ExtractedDocument, ExtractionError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    let pages = match ext.as_str() {
        "pdf" => pdf::extract_pdf(bytes, footer_patterns)?,
        "txt" | "text" | "md" | "markdown" => txt::extract_txt(bytes),
        other => return Err(ExtractionError::UnsupportedType(other.to_string())),
    };

    tracing::debug!(filename, pages = pages.len(), "extracted document");
    Ok(ExtractedDocument {
        filename: filename.to_string(),
        file_type: ext,
        pages,
    })
}

/// Read `path` from disk and extract its text.
pub fn extract_file(
    path: &Path,
    footer_patterns: &[String],
) -> Result<ExtractedDocument, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    extract_text(&bytes, &filename, footer_patterns)
}
