//! Query translation pipeline.
//!
//! - **Expression translation**: Cypher expressions to relational expression trees
//! - **Fold**: splitting `AND` chains into per-binding fragments
//! - **Translator**: assembling fragments and patterns into a CTE statement

mod expression;

pub mod cypher_translator;
pub mod fold;

pub use cypher_translator::{Translator, translate, translate_expression, translate_query};
pub use fold::{Fragment, FragmentMap, dependency_key, fragment, fragment_tree};
