//! Translate command.

use std::path::Path;

use anyhow::{Context, Result};
use pgcypher_engine::{Config, Translator};

use crate::OutputFormat;
use crate::output::{self, Format};

/// Run the translate command.
pub fn run(
    config: Config,
    query: Option<String>,
    file: Option<&Path>,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let query = match (query, file) {
        (Some(query), _) => query,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read query {}", path.display()))?,
        (None, None) => anyhow::bail!("no query given"),
    };

    let translator = Translator::new(config);
    let result = translator.translate(query.trim())?;
    tracing::info!(length = result.value.len(), "translated query");

    match Format::from(format) {
        Format::Json => output::print_json(&output::QueryOutput::from(&result))?,
        Format::Table => println!("{}", result.value),
    }
    output::success("translation complete", quiet);
    Ok(())
}
