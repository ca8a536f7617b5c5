//! # pgcypher-engine
//!
//! Cypher to PostgreSQL translation: expression lowering, predicate
//! fragmentation and statement assembly.
//!
//! ## Modules
//!
//! - [`config`] - Table and column names the generated SQL targets
//! - [`query`] - Expression translation, fragmentation and statement assembly

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod query;

pub use config::Config;
pub use query::{
    Fragment, FragmentMap, Translator, dependency_key, fragment, translate, translate_expression,
    translate_query,
};
