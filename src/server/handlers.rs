use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::{error::ApiError, AppState};
use crate::core::service::UploadError;
use crate::core::types::{Batch, UploadResult};
use crate::document::IncomingFile;

pub const FILES_FIELD: &str = "files";
pub const BATCH_ID_HEADER: &str = "x-batch-id";

pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    // A body that is not multipart at all carries no file part either.
    let Ok(mut multipart) = multipart else {
        return Err(UploadError::NoFilePart.into());
    };

    let mut files = Vec::new();
    let mut saw_file_part = false;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        // Plain form values under the same name are not files.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        saw_file_part = true;
        let bytes = field.bytes().await?;
        files.push(IncomingFile {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    if !saw_file_part {
        return Err(UploadError::NoFilePart.into());
    }

    let batch = state.service.process_batch(files).await?;
    Ok((
        [(BATCH_ID_HEADER, batch.id.to_string())],
        Json(batch.results),
    )
        .into_response())
}

pub async fn extracted_data(State(state): State<AppState>) -> Json<Vec<UploadResult>> {
    Json(state.service.store().latest().await)
}

pub async fn batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<Json<Batch>, ApiError> {
    state
        .service
        .store()
        .get(&batch_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Batch not found: {}", batch_id)))
}

pub async fn list_uploads(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.service.list_uploads().await?))
}

pub async fn serve_pdf(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    match state.service.read_upload(&filename).await? {
        Some(bytes) => Ok((
            [
                (header::CONTENT_TYPE, mime::APPLICATION_PDF.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("inline; filename=\"{}\"", filename),
                ),
            ],
            bytes,
        )
            .into_response()),
        None => Err(ApiError::NotFound(format!("File not found: {}", filename))),
    }
}
