pub mod core;
pub mod document;
pub mod entities;
pub mod pdf;
pub mod server;
pub mod store;
pub mod utils;

// Re-exports
pub use self::core::config::ExtractorConfig;
pub use self::core::service::UploadService;
pub use entities::{EntityExtraction, EntityExtractor, FinancialEntities};
