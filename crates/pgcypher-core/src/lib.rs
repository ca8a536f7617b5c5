//! # pgcypher-core
//!
//! Core data structures for pgcypher: the relational syntax tree that
//! translations produce, the iterative walk engine shared by the source and
//! target trees, the arena used to build and restructure expressions, and the
//! SQL formatter.
//!
//! ## Modules
//!
//! - [`model`] - Relational (PostgreSQL-flavoured) syntax tree
//! - [`walk`] - Cursor-driven iterative depth-first walk
//! - [`tree`] - Arena expression tree and its incremental builder
//! - [`format`] - Stack-based SQL formatter

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod format;
pub mod model;
pub mod tree;
pub mod walk;

pub use format::{FormattedQuery, format_expression, format_statement};
pub use model::{Expression, Operator, Statement, SyntaxNode};
pub use tree::{ExprId, ExpressionTree, NodeKind, TreeBuilder};
pub use walk::{HierarchicalVisitor, WalkCursor, walk};
