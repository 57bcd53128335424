use lopdf::Document;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::{Display, EnumString};
use thiserror::Error;

/// What to do when a single page's text cannot be extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PageFailurePolicy {
    /// Fail the whole document.
    #[default]
    Fail,
    /// Substitute empty text for the page and keep going.
    Skip,
}

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to load PDF: {0}")]
    Load(String),
    #[error("failed to extract text from page {page}: {reason}")]
    Page { page: u32, reason: String },
}

pub type Result<T> = std::result::Result<T, PdfError>;

const NO_TEXT: &str = "no extractable text";

/// Extracts the text of every page of the PDF at `path`, concatenated in page
/// order with no separator between pages.
pub fn extract_text(path: &Path, policy: PageFailurePolicy) -> Result<String> {
    Ok(extract_pages(path, policy)?.concat())
}

/// Per-page text in page order.
pub fn extract_pages(path: &Path, policy: PageFailurePolicy) -> Result<Vec<String>> {
    let doc = Document::load(path).map_err(|e| PdfError::Load(e.to_string()))?;
    pages_of(&doc, policy)
}

/// Same as [`extract_text`] for a PDF already held in memory.
pub fn extract_text_from_mem(bytes: &[u8], policy: PageFailurePolicy) -> Result<String> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Load(e.to_string()))?;
    Ok(pages_of(&doc, policy)?.concat())
}

fn pages_of(doc: &Document, policy: PageFailurePolicy) -> Result<Vec<String>> {
    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len());

    for page_num in pages.keys() {
        let outcome = doc
            .extract_text(&[*page_num])
            .map_err(|e| e.to_string())
            .and_then(|text| {
                // Loaded but textless pages are usually scanned images.
                if text.trim().is_empty() {
                    Err(NO_TEXT.to_string())
                } else {
                    Ok(text)
                }
            });

        match outcome {
            Ok(text) => texts.push(text),
            Err(reason) => match policy {
                PageFailurePolicy::Fail => {
                    return Err(PdfError::Page {
                        page: *page_num,
                        reason,
                    })
                }
                PageFailurePolicy::Skip => {
                    log::warn!("Skipping unreadable page {}: {}", page_num, reason);
                    texts.push(String::new());
                }
            },
        }
    }

    log::debug!("Extracted text from {} pages", texts.len());
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("fail".parse::<PageFailurePolicy>().unwrap(), PageFailurePolicy::Fail);
        assert_eq!("SKIP".parse::<PageFailurePolicy>().unwrap(), PageFailurePolicy::Skip);
        assert!("retry".parse::<PageFailurePolicy>().is_err());
        assert_eq!(PageFailurePolicy::Skip.to_string(), "skip");
    }

    #[test]
    fn test_garbage_is_load_error() {
        let err = extract_text_from_mem(b"definitely not a pdf", PageFailurePolicy::Skip).unwrap_err();
        assert!(matches!(err, PdfError::Load(_)));
    }
}
