//! Output formatting for CLI commands.

use comfy_table::{Cell, Color, ContentArrangement, Table};
use indexmap::IndexMap;
use pgcypher_common::Value;
use pgcypher_core::format::FormattedQuery;
use serde::Serialize;

/// Output format selection.
#[derive(Clone, Copy)]
pub enum Format {
    Table,
    Json,
}

impl From<crate::OutputFormat> for Format {
    fn from(f: crate::OutputFormat) -> Self {
        match f {
            crate::OutputFormat::Table => Format::Table,
            crate::OutputFormat::Json => Format::Json,
        }
    }
}

/// JSON shape of a translated query.
#[derive(Serialize)]
pub struct QueryOutput<'a> {
    query: &'a str,
    parameters: &'a IndexMap<String, Value>,
}

impl<'a> From<&'a FormattedQuery> for QueryOutput<'a> {
    fn from(result: &'a FormattedQuery) -> Self {
        Self {
            query: &result.value,
            parameters: &result.parameters,
        }
    }
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Create a styled table with consistent formatting.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    table
}

/// Add a header row to a table.
pub fn add_header(table: &mut Table, headers: &[&str]) {
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
}

/// Add a row with a highlighted key column.
pub fn add_key_row(table: &mut Table, key: &str, value: &str) {
    table.add_row(vec![Cell::new(key).fg(Color::Green), Cell::new(value)]);
}

/// Print a status message to stderr (respects quiet mode).
pub fn status(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{msg}");
    }
}

/// Print a success message to stderr.
pub fn success(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("✓ {msg}");
    }
}
