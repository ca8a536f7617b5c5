//! CLI command implementations.

pub mod fragments;
pub mod translate;

use std::path::Path;

use anyhow::{Context, Result};
use pgcypher_engine::Config;

/// Loads the translation configuration, falling back to the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}
