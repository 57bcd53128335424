pub mod error;
pub mod handlers;

use anyhow::Result;
use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};

use crate::core::{config::ExtractorConfig, service::UploadService};
use crate::entities::EntityExtractor;
use crate::store::ResultStore;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<UploadService>,
}

/// Builds the service and router from `config`, using `extractor` for the
/// entity extraction step.
pub fn app(config: &ExtractorConfig, extractor: Arc<dyn EntityExtractor>) -> Result<Router> {
    let service = UploadService::new(
        config.upload_dir.clone(),
        config.page_policy,
        extractor,
        ResultStore::new(config.max_retained_batches),
    )?;
    let state = AppState {
        service: Arc::new(service),
    };

    let frontend = ServeDir::new(&config.frontend_dir)
        .fallback(ServeFile::new(config.frontend_dir.join("index.html")));

    Ok(Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        .route("/api/extracted_data", get(handlers::extracted_data))
        .route("/api/extracted_data/:batch_id", get(handlers::batch))
        .route("/uploads/:filename", get(handlers::serve_pdf))
        .route("/pdf/:filename", get(handlers::serve_pdf))
        .route("/list-uploads", get(handlers::list_uploads))
        .fallback_service(frontend)
        .layer(CorsLayer::permissive())
        .with_state(state))
}
