use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::FinancialEntities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Extracted,
    NoMatch,
    EntityCallFailed,
    TextExtractionFailed,
}

/// One processed document as reported back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub filename: String,
    pub extracted_text: String,
    /// `None` when no entities could be requested or the request failed.
    pub entities: Option<FinancialEntities>,
    #[serde(rename = "pdfUrl")]
    pub pdf_url: String,
    pub status: ResultStatus,
    pub error: Option<String>,
}

/// All results produced by one upload request, in upload order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub results: Vec<UploadResult>,
}

impl Batch {
    pub fn new(results: Vec<UploadResult>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            results,
        }
    }
}

/// Command-line view of a result: no `pdfUrl`, since nothing is served.
#[derive(Debug, Serialize)]
pub struct DocumentReport<'a> {
    pub filename: &'a str,
    pub extracted_text: &'a str,
    pub entities: Option<&'a FinancialEntities>,
    pub status: ResultStatus,
    pub error: Option<&'a str>,
}

impl<'a> From<&'a UploadResult> for DocumentReport<'a> {
    fn from(result: &'a UploadResult) -> Self {
        Self {
            filename: &result.filename,
            extracted_text: &result.extracted_text,
            entities: result.entities.as_ref(),
            status: result.status,
            error: result.error.as_deref(),
        }
    }
}
