use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

/// A file as received from the client, before validation.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A file persisted to the upload directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub filename: String,
    pub path: PathBuf,
}

impl UploadedDocument {
    /// Writes `bytes` under `dir` using the already-sanitized `filename`.
    /// An existing file with the same name is overwritten.
    pub async fn save(dir: &Path, filename: &str, bytes: &[u8]) -> Result<Self> {
        let path = dir.join(filename);
        tokio::fs::write(&path, bytes).await?;
        log::debug!("Saved {} bytes to {:?}", bytes.len(), path);
        Ok(Self {
            filename: filename.to_string(),
            path,
        })
    }

    /// URL path under which the stored PDF is served.
    pub fn url_path(&self) -> String {
        format!("/uploads/{}", self.filename)
    }
}

pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        None => false,
    }
}

/// Reduces a client-supplied name to a flat ASCII filename that is safe to
/// join onto the upload directory. Returns an empty string when nothing usable
/// remains.
pub fn sanitize_filename(name: &str) -> String {
    let ascii: String = name.nfkd().filter(|c| c.is_ascii()).collect();

    let spaced: String = ascii
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// True when `name` can be served from the upload directory as-is.
pub fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}
