use finextract::{
    core::config::ExtractorConfig,
    entities::anthropic::AnthropicExtractor,
    server,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = ExtractorConfig::from_env()?;

    let extractor = AnthropicExtractor::new(config.anthropic())?;
    log::info!("Using model {} at {}", config.model, extractor.endpoint());

    let app = server::app(&config, Arc::new(extractor))?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!(
        "Starting server on {} (uploads in {:?})",
        listener.local_addr()?,
        config.upload_dir
    );
    axum::serve(listener, app).await?;

    Ok(())
}
