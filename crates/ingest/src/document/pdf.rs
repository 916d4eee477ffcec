use super::cleanup::cleanup_page_text;
use super::{ExtractionError, PageContent};

/// Extract and clean PDF text, one entry per non-blank page.
///
/// Scanned PDFs without a text layer yield no pages; callers treat that as
/// an empty document.
pub fn extract_pdf(
    bytes: &[u8],
    footer_patterns: &[String],
) -> Result<Vec<PageContent>, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    if text.trim().is_empty() {
        tracing::warn!("PDF has no extractable text layer");
        return Ok(Vec::new());
    }

    Ok(split_pages(&text, footer_patterns))
}

/// pdf-extract returns all text as one string with form feeds (`\x0C`)
/// between pages.
fn split_pages(text: &str, footer_patterns: &[String]) -> Vec<PageContent> {
    text.split('\x0C')
        .enumerate()
        .map(|(i, raw)| PageContent {
            page_number: i + 1,
            text: cleanup_page_text(raw, footer_patterns).trim().to_string(),
        })
        .filter(|page| !page.text.is_empty())
        .collect()
}
