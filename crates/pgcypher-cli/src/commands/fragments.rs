//! Fragments command.

use anyhow::Result;
use pgcypher_adapters::query::cypher::{self, ast};
use pgcypher_core::format::format_expression;
use pgcypher_engine::{Config, Translator};
use serde::Serialize;

use crate::OutputFormat;
use crate::output::{self, Format};

/// One fragment of a predicate.
#[derive(Serialize)]
struct FragmentOutput {
    key: String,
    dependencies: Vec<String>,
    expression: String,
}

/// Run the fragments command.
pub fn run(config: Config, query: &str, format: OutputFormat, quiet: bool) -> Result<()> {
    let parsed = cypher::parse(query.trim())?;
    let Some(where_clause) = parsed
        .match_clauses
        .iter()
        .find_map(|clause| clause.where_clause.as_ref())
    else {
        output::status("query has no WHERE clause", quiet);
        return Ok(());
    };

    let predicate = match where_clause.expressions.as_slice() {
        [expression] => expression.clone(),
        expressions => ast::Expression::Conjunction(expressions.to_vec()),
    };

    let translator = Translator::new(config);
    let fragments = translator
        .fragment(&predicate)?
        .into_fragments()
        .into_iter()
        .map(|fragment| -> Result<FragmentOutput> {
            Ok(FragmentOutput {
                expression: format_expression(&fragment.expression)?.value,
                key: fragment.key,
                dependencies: fragment.dependencies,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    match Format::from(format) {
        Format::Json => output::print_json(&fragments)?,
        Format::Table => {
            let mut table = output::create_table();
            output::add_header(&mut table, &["Key", "Expression"]);
            for fragment in &fragments {
                let key = if fragment.key.is_empty() {
                    "(constant)"
                } else {
                    fragment.key.as_str()
                };
                output::add_key_row(&mut table, key, &fragment.expression);
            }
            println!("{table}");
        }
    }
    Ok(())
}
