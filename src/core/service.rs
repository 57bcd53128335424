use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use super::types::{Batch, ResultStatus, UploadResult};
use crate::document::{self, IncomingFile, UploadedDocument};
use crate::entities::{EntityExtraction, EntityExtractor, FinancialEntities};
use crate::pdf::{self, PageFailurePolicy};
use crate::store::ResultStore;
use crate::utils::dirs;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file part")]
    NoFilePart,
    #[error("No selected files")]
    NoSelectedFiles,
    #[error("File type not allowed: {0}")]
    FileTypeNotAllowed(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Runs uploaded PDFs through text and entity extraction and keeps the
/// results.
pub struct UploadService {
    upload_dir: PathBuf,
    page_policy: PageFailurePolicy,
    extractor: Arc<dyn EntityExtractor>,
    store: ResultStore,
}

impl UploadService {
    pub fn new(
        upload_dir: PathBuf,
        page_policy: PageFailurePolicy,
        extractor: Arc<dyn EntityExtractor>,
        store: ResultStore,
    ) -> Result<Self> {
        dirs::ensure_dir(&upload_dir)?;
        Ok(Self {
            upload_dir,
            page_policy,
            extractor,
            store,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Processes one upload batch. Every file is validated before anything is
    /// written, so a rejected batch leaves the upload directory untouched.
    pub async fn process_batch(&self, files: Vec<IncomingFile>) -> Result<Batch, UploadError> {
        let accepted = validate(files)?;
        log::info!("Processing upload batch of {} file(s)", accepted.len());

        let mut results = Vec::with_capacity(accepted.len());
        for (filename, file) in accepted {
            let doc = UploadedDocument::save(&self.upload_dir, &filename, &file.bytes).await?;
            let result = analyze(
                &doc.path,
                &doc.filename,
                doc.url_path(),
                self.page_policy,
                self.extractor.as_ref(),
            )
            .await;
            results.push(result);
        }

        let batch = Batch::new(results);
        log::info!("Stored upload batch {}", batch.id);
        self.store.insert(batch.clone()).await;
        Ok(batch)
    }

    pub async fn list_uploads(&self) -> Result<Vec<String>> {
        dirs::list_files(&self.upload_dir).await
    }

    /// Bytes of a stored upload, or `None` if there is no such file.
    pub async fn read_upload(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        if !document::is_plain_filename(filename) {
            return Ok(None);
        }
        let path = self.upload_dir.join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Checks presence and extensions, pairing each file with its sanitized name.
fn validate(files: Vec<IncomingFile>) -> Result<Vec<(String, IncomingFile)>, UploadError> {
    match files.first() {
        None => return Err(UploadError::NoSelectedFiles),
        Some(first) if first.filename.is_empty() => return Err(UploadError::NoSelectedFiles),
        Some(_) => {}
    }

    files
        .into_iter()
        .map(|file| {
            let sanitized = document::sanitize_filename(&file.filename);
            if !document::allowed_file(&file.filename) || !document::allowed_file(&sanitized) {
                return Err(UploadError::FileTypeNotAllowed(file.filename));
            }
            Ok((sanitized, file))
        })
        .collect()
}

/// Extracts the text of the PDF at `path` and the financial entities in it.
/// Failures are reported in the result rather than returned.
pub async fn analyze(
    path: &Path,
    filename: &str,
    pdf_url: String,
    page_policy: PageFailurePolicy,
    extractor: &dyn EntityExtractor,
) -> UploadResult {
    let owned_path = path.to_path_buf();
    let extracted =
        tokio::task::spawn_blocking(move || pdf::extract_text(&owned_path, page_policy)).await;

    let text = match extracted {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return text_failure(filename, pdf_url, e.to_string()),
        Err(e) => return text_failure(filename, pdf_url, format!("extraction task failed: {}", e)),
    };
    log::debug!("Extracted {} chars of text from {}", text.len(), filename);

    let (entities, status, error) = match extractor.extract(&text).await {
        EntityExtraction::Structured(entities) => (Some(entities), ResultStatus::Extracted, None),
        EntityExtraction::NoMatch => (
            Some(FinancialEntities::default()),
            ResultStatus::NoMatch,
            None,
        ),
        EntityExtraction::CallFailed(reason) => {
            log::error!("Entity extraction failed for {}: {}", filename, reason);
            (None, ResultStatus::EntityCallFailed, Some(reason))
        }
    };

    UploadResult {
        filename: filename.to_string(),
        extracted_text: text,
        entities,
        pdf_url,
        status,
        error,
    }
}

fn text_failure(filename: &str, pdf_url: String, reason: String) -> UploadResult {
    log::warn!("Text extraction failed for {}: {}", filename, reason);
    UploadResult {
        filename: filename.to_string(),
        extracted_text: String::new(),
        entities: None,
        pdf_url,
        status: ResultStatus::TextExtractionFailed,
        error: Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> IncomingFile {
        IncomingFile {
            filename: name.to_string(),
            bytes: b"%PDF-1.5".to_vec(),
        }
    }

    #[test]
    fn test_validate_empty_batch() {
        assert!(matches!(validate(vec![]), Err(UploadError::NoSelectedFiles)));
        assert!(matches!(
            validate(vec![file(""), file("a.pdf")]),
            Err(UploadError::NoSelectedFiles)
        ));
    }

    #[test]
    fn test_validate_rejects_on_any_bad_extension() {
        match validate(vec![file("a.pdf"), file("notes.txt"), file("b.pdf")]) {
            Err(UploadError::FileTypeNotAllowed(name)) => assert_eq!(name, "notes.txt"),
            other => panic!("unexpected: {:?}", other.map(|v| v.len())),
        }
        assert!(matches!(
            validate(vec![file("a.pdf"), file("")]),
            Err(UploadError::FileTypeNotAllowed(_))
        ));
    }

    #[test]
    fn test_validate_sanitizes_names() {
        let accepted = validate(vec![file("Q3 report.pdf"), file("../up.PDF")]).unwrap();
        let names: Vec<_> = accepted.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Q3_report.pdf", "up.PDF"]);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(UploadError::NoFilePart.to_string(), "No file part");
        assert_eq!(UploadError::NoSelectedFiles.to_string(), "No selected files");
        assert_eq!(
            UploadError::FileTypeNotAllowed("x.txt".into()).to_string(),
            "File type not allowed: x.txt"
        );
    }
}
