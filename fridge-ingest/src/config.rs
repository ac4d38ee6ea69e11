//! Configuration resolution for fridge-ingest
//!
//! Embedding API key priority: `FRIDGE_EMBEDDING_API_KEY` → `OPENAI_API_KEY` → TOML

use fridge_common::config::EmbeddingConfig;
use fridge_common::{Error, Result};
use tracing::{info, warn};

/// Service-specific key variable (highest priority)
pub const EMBEDDING_API_KEY_ENV: &str = "FRIDGE_EMBEDDING_API_KEY";

/// Conventional OpenAI key variable
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Resolve the embedding API key from environment and TOML
pub fn resolve_embedding_api_key(config: &EmbeddingConfig) -> Result<String> {
    let candidates = [
        (EMBEDDING_API_KEY_ENV, std::env::var(EMBEDDING_API_KEY_ENV).ok()),
        (OPENAI_API_KEY_ENV, std::env::var(OPENAI_API_KEY_ENV).ok()),
        ("TOML config", config.api_key.clone()),
    ];

    let valid: Vec<(&str, String)> = candidates
        .into_iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (source, k)))
        .collect();

    // Warn if multiple sources (potential misconfiguration)
    if valid.len() > 1 {
        let sources: Vec<&str> = valid.iter().map(|(source, _)| *source).collect();
        warn!(
            "Embedding API key found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    match valid.into_iter().next() {
        Some((source, key)) => {
            info!("Embedding API key loaded from {}", source);
            Ok(key.trim().to_string())
        }
        None => Err(Error::Config(format!(
            "Embedding API key not configured. Please configure using one of:\n\
             1. Environment: {}=your-key-here\n\
             2. Environment: {}=your-key-here\n\
             3. TOML config: [embedding] api_key = \"your-key\"",
            EMBEDDING_API_KEY_ENV, OPENAI_API_KEY_ENV
        ))),
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
