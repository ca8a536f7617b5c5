//! # pgcypher
//!
//! A pure-Rust translator from Cypher graph queries to PostgreSQL.
//!
//! Start with [`translate`] for the default schema, or build a [`Translator`]
//! with a [`Config`] when your node and edge tables use other names. Each
//! node and relationship in a `MATCH` becomes a common table expression, and
//! `WHERE` predicates are split so every part lands in the first CTE that
//! can evaluate it.
//!
//! ## Quick Start
//!
//! ```rust
//! let sql = pgcypher::translate("match (s)-[r]->(e) where s.name = 'a' return e")?;
//! assert!(sql.value.starts_with("with s as (select * from node s where"));
//! # Ok::<(), pgcypher::Error>(())
//! ```
//!
//! ## Crates
//!
//! | Crate | Contents |
//! | ----- | -------- |
//! | `pgcypher-common` | Error type and scalar values |
//! | `pgcypher-adapters` | Cypher lexer, parser and AST |
//! | `pgcypher-core` | Relational syntax tree, walk engine, formatter |
//! | `pgcypher-engine` | Expression translation, fragmentation, statement assembly |

// Translation entry points
pub use pgcypher_engine::{
    Config, Fragment, FragmentMap, Translator, dependency_key, fragment, translate,
    translate_expression, translate_query,
};

// Errors and values
pub use pgcypher_common::{Error, ErrorKind, Result, Value};

// Output
pub use pgcypher_core::format::{FormattedQuery, format_expression, format_statement};

/// Cypher front-end.
pub mod cypher {
    pub use pgcypher_adapters::query::cypher::{ast, parse};
}

/// Relational syntax tree.
pub mod sql {
    pub use pgcypher_core::model::*;
}
