//! # pgcypher-adapters
//!
//! Adapters layer for pgcypher: query language front-ends.
//!
//! ## Modules
//!
//! - [`query`] - Query language parsers (Cypher)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod query;
