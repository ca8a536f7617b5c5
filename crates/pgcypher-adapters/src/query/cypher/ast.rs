//! Cypher Abstract Syntax Tree.

use pgcypher_common::types::Value;
use pgcypher_common::utils::error::SourceSpan;
use pgcypher_core::model::SyntaxNode;
use smallvec::SmallVec;

/// A single-part read query: one or more `MATCH` clauses and a `RETURN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// MATCH clauses in source order.
    pub match_clauses: Vec<MatchClause>,
    /// Required RETURN clause.
    pub return_clause: ReturnClause,
    /// Source span in the original query.
    pub span: Option<SourceSpan>,
}

/// A MATCH clause.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchClause {
    /// Comma-separated pattern parts.
    pub patterns: Vec<PatternPart>,
    /// Optional WHERE clause.
    pub where_clause: Option<WhereClause>,
    /// Source span.
    pub span: Option<SourceSpan>,
}

/// A WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// Predicate expressions. The parser always produces exactly one.
    pub expressions: Vec<Expression>,
}

/// One comma-separated part of a pattern, e.g. `p = (a)-[r]->(b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternPart {
    /// Path variable, if the part is bound with `p = ...`.
    pub binding: Option<String>,
    /// Alternating node and relationship elements, starting with a node.
    pub elements: Vec<PatternElement>,
}

/// A pattern element.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternElement {
    /// `(n:Label)`.
    Node(NodePattern),
    /// `-[r:TYPE]->`.
    Relationship(RelationshipPattern),
}

/// A node pattern.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodePattern {
    /// Variable name.
    pub binding: Option<String>,
    /// Labels.
    pub labels: Vec<String>,
}

/// A relationship pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipPattern {
    /// Variable name.
    pub binding: Option<String>,
    /// Relationship types (`:A|B`).
    pub types: Vec<String>,
    /// Direction relative to the written order.
    pub direction: Direction,
    /// Variable-length range (`*`, `*1..3`).
    pub range: Option<PatternRange>,
}

/// Relationship direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `-->`: from the left node to the right node.
    Outbound,
    /// `<--`: from the right node to the left node.
    Inbound,
    /// `--`: either way.
    Both,
}

/// Variable-length bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternRange {
    /// Minimum hops.
    pub start: Option<u64>,
    /// Maximum hops.
    pub end: Option<u64>,
}

/// A RETURN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnClause {
    /// RETURN DISTINCT.
    pub distinct: bool,
    /// Items to return.
    pub items: Vec<ReturnItem>,
    /// Source span.
    pub span: Option<SourceSpan>,
}

/// A return item.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnItem {
    /// Expression to return.
    pub expression: Expression,
    /// Alias (AS name).
    pub alias: Option<String>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value.
    Literal(Literal),
    /// A variable reference.
    Variable(String),
    /// A parameter reference ($name).
    Parameter(String),
    /// A property lookup (`n.name`, `n.address.city`).
    PropertyLookup(PropertyLookup),
    /// NOT expr.
    Negation(Box<Expression>),
    /// expr AND expr AND ...
    Conjunction(Vec<Expression>),
    /// expr OR expr OR ...
    Disjunction(Vec<Expression>),
    /// A comparison chain (`a < b <= c`).
    Comparison(Chain),
    /// An arithmetic chain of one precedence level (`a + b - c`).
    Arithmetic(Chain),
    /// A parenthesized expression.
    Parenthetical(Box<Expression>),
    /// A function call.
    FunctionInvocation {
        /// Function name.
        name: String,
        /// Whether DISTINCT was given.
        distinct: bool,
        /// Arguments.
        arguments: Vec<Expression>,
    },
    /// A list expression.
    List(Vec<Expression>),
}

impl SyntaxNode for Expression {
    fn node_type(&self) -> &'static str {
        match self {
            Expression::Literal(_) => "literal",
            Expression::Variable(_) => "variable",
            Expression::Parameter(_) => "parameter",
            Expression::PropertyLookup(_) => "property_lookup",
            Expression::Negation(_) => "negation",
            Expression::Conjunction(_) => "conjunction",
            Expression::Disjunction(_) => "disjunction",
            Expression::Comparison(_) => "comparison",
            Expression::Arithmetic(_) => "arithmetic_expression",
            Expression::Parenthetical(_) => "parenthetical",
            Expression::FunctionInvocation { .. } => "function_invocation",
            Expression::List(_) => "list_literal",
        }
    }
}

/// A literal value.
///
/// String values keep the quotes they were written with.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// The value.
    pub value: Value,
    /// Set for `null`.
    pub null: bool,
}

impl Literal {
    /// Creates a non-null literal.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            null: false,
        }
    }

    /// Creates a `null` literal.
    pub fn null() -> Self {
        Self {
            value: Value::Null,
            null: true,
        }
    }
}

/// `atom.symbol[.symbol...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyLookup {
    /// The expression being dereferenced, normally a variable.
    pub atom: Box<Expression>,
    /// Property names in access order.
    pub symbols: SmallVec<[String; 2]>,
}

/// A head operand followed by `(operator, operand)` links, evaluated left to
/// right.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// First operand.
    pub left: Box<Expression>,
    /// Continuation links.
    pub partials: Vec<Partial>,
}

/// One `(operator, operand)` link of a [`Chain`].
#[derive(Debug, Clone, PartialEq)]
pub struct Partial {
    /// Operator joining the accumulated value and `right`.
    pub operator: Operator,
    /// Right operand.
    pub right: Expression,
}

/// Comparison and arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Comparison
    /// `=`
    Equals,
    /// `<>`
    NotEquals,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqualTo,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqualTo,

    // Arithmetic
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `^`
    Power,
}

impl Operator {
    /// The operator as written in Cypher.
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "<>",
            Operator::LessThan => "<",
            Operator::LessThanOrEqualTo => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqualTo => ">=",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Power => "^",
        }
    }
}
