//! Relational statements and their clauses.

use super::SyntaxNode;
use super::expression::{CompoundIdentifier, Expression};

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A query, possibly with CTEs.
    Query(Query),
    /// `insert into ...`.
    Insert(Insert),
    /// `update ...`.
    Update(Update),
    /// `delete from ...`.
    Delete(Delete),
    /// `merge ...`.
    Merge(Merge),
}

impl SyntaxNode for Statement {
    fn node_type(&self) -> &'static str {
        match self {
            Statement::Query(_) => "query",
            Statement::Insert(_) => "insert",
            Statement::Update(_) => "update",
            Statement::Delete(_) => "delete",
            Statement::Merge(_) => "merge",
        }
    }
}

/// A query: an optional CTE block followed by a body.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// `with ...` block.
    pub common_table_expressions: Option<With>,
    /// The query body.
    pub body: SetExpression,
}

impl Query {
    /// Creates a query with no CTEs.
    pub fn new(body: SetExpression) -> Self {
        Self {
            common_table_expressions: None,
            body,
        }
    }
}

/// A `with` block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct With {
    /// `with recursive`.
    pub recursive: bool,
    /// CTEs in declaration order.
    pub expressions: Vec<CommonTableExpression>,
}

/// `<alias> as [materialized] (<query>)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpression {
    /// Name and optional column list.
    pub alias: TableAlias,
    /// `Some(true)` prints `materialized`, `Some(false)` prints `not materialized`.
    pub materialized: Option<bool>,
    /// The CTE body.
    pub query: Query,
}

/// A table alias with an optional column list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableAlias {
    /// Alias name.
    pub name: String,
    /// Column names.
    pub columns: Vec<String>,
}

impl TableAlias {
    /// Creates an alias with no column list.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }
}

/// Anything that can stand where a query body goes.
#[derive(Debug, Clone, PartialEq)]
pub enum SetExpression {
    /// A nested query.
    Query(Box<Query>),
    /// A select.
    Select(Box<Select>),
    /// `union` / `intersect` / `except`.
    SetOperation(Box<SetOperation>),
    /// `values (...)`.
    Values(Values),
}

impl SyntaxNode for SetExpression {
    fn node_type(&self) -> &'static str {
        match self {
            SetExpression::Query(_) => "query",
            SetExpression::Select(_) => "select",
            SetExpression::SetOperation(_) => "set_operation",
            SetExpression::Values(_) => "values",
        }
    }
}

/// A select.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    /// `select distinct`.
    pub distinct: bool,
    /// Projection list.
    pub projection: Vec<Expression>,
    /// `from` list.
    pub from: Vec<FromClause>,
    /// `where` predicate.
    pub where_clause: Option<Expression>,
    /// `group by` keys.
    pub group_by: Vec<Expression>,
    /// `having` predicate.
    pub having: Option<Expression>,
}

/// One entry of a `from` list with its joins.
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    /// The base relation.
    pub relation: TableReference,
    /// Joins applied to it.
    pub joins: Vec<Join>,
}

impl FromClause {
    /// Creates a from entry with no joins.
    pub fn new(relation: TableReference) -> Self {
        Self {
            relation,
            joins: Vec::new(),
        }
    }
}

/// `[<type>] join <table> on <constraint>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Joined table.
    pub table: TableReference,
    /// Join type and constraint.
    pub join_operator: JoinOperator,
}

/// Join type and constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOperator {
    /// Join type.
    pub join_type: JoinType,
    /// The `on` predicate.
    pub constraint: Expression,
}

/// Join types. A bare `join` is inner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    /// `join`
    #[default]
    Inner,
    /// `left outer join`
    LeftOuter,
    /// `right outer join`
    RightOuter,
    /// `full outer join`
    FullOuter,
}

/// A table name with an optional binding, e.g. `node s`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReference {
    /// Table name.
    pub name: CompoundIdentifier,
    /// Alias the table is bound to.
    pub binding: Option<String>,
}

impl TableReference {
    /// Creates an unbound reference to a single-part name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: CompoundIdentifier::from_parts([name.into()]),
            binding: None,
        }
    }

    /// Sets the binding.
    pub fn with_binding(mut self, binding: impl Into<String>) -> Self {
        self.binding = Some(binding.into());
        self
    }
}

/// Set operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    /// `union`
    Union,
    /// `intersect`
    Intersect,
    /// `except`
    Except,
}

impl SetOperator {
    /// The operator's SQL spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            SetOperator::Union => "union",
            SetOperator::Intersect => "intersect",
            SetOperator::Except => "except",
        }
    }
}

/// `<left> <op> [all|distinct] <right>`. `all` and `distinct` exclude each
/// other.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    /// Operator.
    pub operator: SetOperator,
    /// Left side.
    pub left: SetExpression,
    /// Right side.
    pub right: SetExpression,
    /// `all`.
    pub all: bool,
    /// `distinct`.
    pub distinct: bool,
}

/// `values (...)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Values {
    /// Row values.
    pub values: Vec<Expression>,
}

/// `<column> = <value>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Target column.
    pub identifier: String,
    /// New value.
    pub value: Expression,
}

/// `insert into`.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// Target table.
    pub table: TableReference,
    /// Column list.
    pub columns: Vec<String>,
    /// Row source.
    pub source: Option<Query>,
    /// `on conflict` clause.
    pub on_conflict: Option<OnConflict>,
    /// `returning` list.
    pub returning: Vec<Expression>,
}

/// `on conflict [<target>] <action>`.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    /// Conflict target.
    pub target: Option<ConflictTarget>,
    /// What to do on conflict.
    pub action: ConflictAction,
}

/// Either a column list or a named constraint, never both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConflictTarget {
    /// `(a, b)`.
    pub columns: Vec<String>,
    /// `on constraint <name>`.
    pub constraint: Option<String>,
}

/// Conflict resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    /// `do nothing`.
    DoNothing,
    /// `do update set ... [where ...]`.
    DoUpdate(DoUpdate),
}

/// `do update set ... [where ...]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DoUpdate {
    /// Assignments.
    pub assignments: Vec<Assignment>,
    /// Optional predicate.
    pub where_clause: Option<Expression>,
}

/// `update`.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Target table.
    pub table: TableReference,
    /// Assignments.
    pub assignments: Vec<Assignment>,
    /// Optional predicate.
    pub where_clause: Option<Expression>,
}

/// `delete from`.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Target table.
    pub table: TableReference,
    /// Optional predicate.
    pub where_clause: Option<Expression>,
}

/// `merge [into] <table> using <source> on <join_target> <actions>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    /// `merge into`.
    pub into: bool,
    /// Target table.
    pub table: TableReference,
    /// Source table.
    pub source: TableReference,
    /// Join predicate.
    pub join_target: Expression,
    /// `when ...` actions in order.
    pub actions: Vec<MergeAction>,
}

/// One `when` arm of a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeAction {
    /// `when matched [and p] then update set ...`.
    MatchedUpdate {
        /// Optional extra predicate.
        predicate: Option<Expression>,
        /// Assignments.
        assignments: Vec<Assignment>,
    },
    /// `when matched [and p] then delete`.
    MatchedDelete {
        /// Optional extra predicate.
        predicate: Option<Expression>,
    },
    /// `when not matched [and p] then insert (...) values (...)`.
    UnmatchedAction {
        /// Optional extra predicate.
        predicate: Option<Expression>,
        /// Inserted columns.
        columns: Vec<String>,
        /// Inserted values.
        values: Values,
    },
}
