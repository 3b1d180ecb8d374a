use anyhow::Result;
use calidad_agua::{
    bootstrap,
    config::{Config, RuntimeConfig},
    http::start_http_server,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Env files first so RUST_LOG from .env reaches the subscriber, which must
    // exist before Config::load logs its warnings
    Config::load_env_files();
    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| RuntimeConfig::default().log_level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&log_level))
        .init();

    let config = Config::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Starting calidad-agua API");
    info!(
        "Configuration loaded: dataset={}, list_cap={}, match_synonyms={}",
        config.data.csv_path, config.query.list_cap, config.chatbot.match_synonyms
    );

    // Dataset, keyword table and lexicon are built once and shared read-only
    let state = tokio::task::spawn_blocking(move || bootstrap(config)).await??;
    info!(
        "Serving {} measurements",
        state.engine.store().len()
    );

    start_http_server(state).await
}
