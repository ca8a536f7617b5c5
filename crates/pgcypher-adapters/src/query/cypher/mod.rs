//! Cypher front-end.
//!
//! Covers the subset the translator lowers: `MATCH` clauses with node and
//! relationship patterns, `WHERE` predicates over boolean, comparison and
//! arithmetic expressions, and `RETURN`. String literals keep their quotes
//! in the AST.

pub mod ast;
mod lexer;
mod parser;
pub mod walk;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use pgcypher_common::utils::error::Result;

/// Parses a Cypher query string into an AST.
///
/// # Errors
///
/// Returns a syntax error if the query is malformed.
pub fn parse(query: &str) -> Result<ast::Query> {
    let mut parser = Parser::new(query);
    let parsed = parser.parse()?;
    tracing::trace!(
        match_clauses = parsed.match_clauses.len(),
        return_items = parsed.return_clause.items.len(),
        "parsed cypher query"
    );
    Ok(parsed)
}
