pub mod chatbot;
pub mod config;
pub mod error;
pub mod http;
pub mod lexicon;
pub mod normalize;
pub mod query;
pub mod store;

use anyhow::{Context, Result};
use std::sync::Arc;

// Load env from a simple, standardized location resolution.
// This uses dotenvy::dotenv().ok() which loads .env if present and silently ignores if missing.
pub fn load_env() {
    let _ = dotenvy::dotenv();
}

/// Build every read-only service from configuration: the record store (CSV),
/// the keyword table, the lexicon. Runs once at startup.
pub fn bootstrap(config: config::Config) -> Result<http::HttpState> {
    let delimiter = config.data.delimiter_byte()?;
    let (store, report) = store::load_csv(&config.data.csv_path, delimiter)
        .with_context(|| format!("Failed to load dataset {}", config.data.csv_path))?;
    if report.loaded == 0 {
        tracing::warn!("Dataset loaded but no complete rows survived cleaning");
    }
    bootstrap_with_store(config, store)
}

/// Same as [`bootstrap`] with an already built store
pub fn bootstrap_with_store(
    config: config::Config,
    store: store::RecordStore,
) -> Result<http::HttpState> {
    let keywords = match config
        .chatbot
        .keywords_path
        .as_deref()
        .filter(|p| !p.trim().is_empty())
    {
        Some(path) => chatbot::keywords::KeywordTable::load(path)?,
        None => chatbot::keywords::KeywordTable::builtin()?,
    };
    tracing::info!("Keyword table ready ({} triggers)", keywords.len());

    let lexicon = lexicon::create_lexicon(&config.chatbot)?;
    let chatbot = chatbot::Chatbot::new(Arc::new(keywords), lexicon, &config.chatbot);

    Ok(http::HttpState {
        engine: query::QueryEngine::new(Arc::new(store)),
        chatbot,
        config: Arc::new(config),
    })
}
