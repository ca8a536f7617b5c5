//! Relational syntax tree.
//!
//! The target side of a translation. Every category of node is a closed
//! enum, so each consumer (the arena importer, the formatter) matches on all
//! variants.
//!
//! ```text
//! Statement
//!   └── Query { with: [CommonTableExpression], body: SetExpression }
//!         └── Select { projection, from: [FromClause], where }
//!               └── Expression (Binary / Unary / Literal / ...)
//! ```

mod expression;
mod statement;

pub use expression::{
    ArrayLiteral, BinaryExpression, CompoundIdentifier, DataType, Expression, FunctionCall,
    Literal, Operator, OrderBy, UnaryExpression, Window,
};
pub use statement::{
    Assignment, CommonTableExpression, ConflictAction, ConflictTarget, Delete, DoUpdate,
    FromClause, Insert, Join, JoinOperator, JoinType, Merge, MergeAction, OnConflict, Query,
    Select, SetExpression, SetOperation, SetOperator, Statement, TableAlias, TableReference,
    Update, Values, With,
};

/// Anything identifiable by a node-type tag.
///
/// The tag is what diagnostics such as
/// [`Error::UnsupportedConstruct`](pgcypher_common::Error::UnsupportedConstruct)
/// report.
pub trait SyntaxNode {
    /// Returns the node-type tag.
    fn node_type(&self) -> &'static str;
}
