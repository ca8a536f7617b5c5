//! SQL formatter.
//!
//! Serializes the relational tree to text with a single explicit work stack:
//! each node pushes its pieces in reverse order and the loop writes text
//! fragments as they surface. Grouping comes from the tree shape alone; no
//! parentheses are added beyond explicit [`Expression::Parenthetical`] nodes.

use indexmap::IndexMap;
use pgcypher_common::types::Value;
use pgcypher_common::utils::error::{Error, Result};
use serde::Serialize;

use crate::model::{
    Assignment, CommonTableExpression, ConflictAction, ConflictTarget, Expression, FromClause,
    Join, JoinType, Literal, MergeAction, OrderBy, Query, Select, SetExpression, Statement,
    SyntaxNode, TableReference, Values, Window,
};

/// Formatted query text plus the parameters it refers to.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FormattedQuery {
    /// The query text.
    pub value: String,
    /// Named parameters. Literals are inlined, so this is currently empty.
    pub parameters: IndexMap<String, Value>,
}

/// Formats a statement.
pub fn format_statement(statement: &Statement) -> Result<FormattedQuery> {
    tracing::trace!(node_type = statement.node_type(), "formatting statement");

    let mut formatter = Formatter::new();
    match statement {
        Statement::Query(query) => formatter.push(Frame::Query(query)),
        Statement::Insert(insert) => {
            if !insert.returning.is_empty() {
                formatter.push_list(&insert.returning, ", ", Frame::Expression);
                formatter.push(Frame::Text(" returning "));
            }
            if let Some(on_conflict) = &insert.on_conflict {
                formatter.push(Frame::ConflictAction(&on_conflict.action));
                if let Some(target) = &on_conflict.target {
                    formatter.push(Frame::Text(" "));
                    formatter.push(Frame::ConflictTarget(target));
                }
                formatter.push(Frame::Text(" on conflict "));
            }
            if let Some(source) = &insert.source {
                formatter.push(Frame::Query(source));
                formatter.push(Frame::Text(" "));
            }
            if !insert.columns.is_empty() {
                formatter.push(Frame::Text(")"));
                formatter.push_list(&insert.columns, ", ", |c| Frame::Str(c));
                formatter.push(Frame::Text(" ("));
            }
            formatter.push(Frame::Table(&insert.table));
            formatter.push(Frame::Text("insert into "));
        }
        Statement::Update(update) => {
            if let Some(where_clause) = &update.where_clause {
                formatter.push(Frame::Expression(where_clause));
                formatter.push(Frame::Text(" where "));
            }
            formatter.push_list(&update.assignments, ", ", Frame::Assignment);
            formatter.push(Frame::Text(" set "));
            formatter.push(Frame::Table(&update.table));
            formatter.push(Frame::Text("update "));
        }
        Statement::Delete(delete) => {
            if let Some(where_clause) = &delete.where_clause {
                formatter.push(Frame::Expression(where_clause));
                formatter.push(Frame::Text(" where "));
            }
            formatter.push(Frame::Table(&delete.table));
            formatter.push(Frame::Text("delete from "));
        }
        Statement::Merge(merge) => {
            formatter.push_list(&merge.actions, " ", Frame::MergeAction);
            formatter.push(Frame::Text(" "));
            formatter.push(Frame::Expression(&merge.join_target));
            formatter.push(Frame::Text(" on "));
            formatter.push(Frame::Table(&merge.source));
            formatter.push(Frame::Text(" using "));
            formatter.push(Frame::Table(&merge.table));
            formatter.push(Frame::Text(if merge.into { "merge into " } else { "merge " }));
        }
    }
    formatter.run()
}

/// Formats a single expression.
pub fn format_expression(expression: &Expression) -> Result<FormattedQuery> {
    let mut formatter = Formatter::new();
    formatter.push(Frame::Expression(expression));
    formatter.run()
}

/// One pending piece of output.
enum Frame<'a> {
    Text(&'static str),
    Str(&'a str),
    Expression(&'a Expression),
    Query(&'a Query),
    SetExpression(&'a SetExpression),
    Select(&'a Select),
    CommonTableExpression(&'a CommonTableExpression),
    From(&'a FromClause),
    Join(&'a Join),
    Table(&'a TableReference),
    Assignment(&'a Assignment),
    Values(&'a Values),
    Window(&'a Window),
    OrderBy(&'a OrderBy),
    ConflictTarget(&'a ConflictTarget),
    ConflictAction(&'a ConflictAction),
    MergeAction(&'a MergeAction),
}

struct Formatter<'a> {
    output: String,
    stack: Vec<Frame<'a>>,
}

impl<'a> Formatter<'a> {
    fn new() -> Self {
        Self {
            output: String::new(),
            stack: Vec::new(),
        }
    }

    fn push(&mut self, frame: Frame<'a>) {
        self.stack.push(frame);
    }

    /// Pushes `items` so they pop in order, separated by `separator`.
    fn push_list<T>(
        &mut self,
        items: &'a [T],
        separator: &'static str,
        frame: impl Fn(&'a T) -> Frame<'a>,
    ) {
        for (idx, item) in items.iter().enumerate().rev() {
            self.stack.push(frame(item));
            if idx > 0 {
                self.stack.push(Frame::Text(separator));
            }
        }
    }

    fn run(mut self) -> Result<FormattedQuery> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Text(text) => self.output.push_str(text),
                Frame::Str(text) => self.output.push_str(text),
                Frame::Expression(expression) => self.expression(expression),
                Frame::Query(query) => {
                    self.push(Frame::SetExpression(&query.body));
                    if let Some(with) = &query.common_table_expressions {
                        // Trailing space separates the CTE block from the body.
                        self.push(Frame::Text(" "));
                        self.push_list(&with.expressions, ", ", Frame::CommonTableExpression);
                        self.push(Frame::Text(if with.recursive {
                            "with recursive "
                        } else {
                            "with "
                        }));
                    }
                }
                Frame::SetExpression(set_expression) => match set_expression {
                    SetExpression::Query(query) => self.push(Frame::Query(query)),
                    SetExpression::Select(select) => self.push(Frame::Select(select)),
                    SetExpression::Values(values) => self.push(Frame::Values(values)),
                    SetExpression::SetOperation(operation) => {
                        if operation.all && operation.distinct {
                            return Err(Error::invalid_shape(
                                "set operation may not be both ALL and DISTINCT",
                            ));
                        }
                        self.push(Frame::SetExpression(&operation.right));
                        if operation.distinct {
                            self.push(Frame::Text("distinct "));
                        }
                        if operation.all {
                            self.push(Frame::Text("all "));
                        }
                        self.push(Frame::Text(" "));
                        self.push(Frame::Text(operation.operator.as_str()));
                        self.push(Frame::Text(" "));
                        self.push(Frame::SetExpression(&operation.left));
                    }
                },
                Frame::Select(select) => self.select(select),
                Frame::CommonTableExpression(cte) => {
                    self.push(Frame::Text(")"));
                    self.push(Frame::Query(&cte.query));
                    self.push(Frame::Text("("));
                    match cte.materialized {
                        Some(true) => self.push(Frame::Text("materialized ")),
                        Some(false) => self.push(Frame::Text("not materialized ")),
                        None => {}
                    }
                    self.push(Frame::Text(" as "));
                    if !cte.alias.columns.is_empty() {
                        self.push(Frame::Text(")"));
                        self.push_list(&cte.alias.columns, ", ", |c| Frame::Str(c));
                        self.push(Frame::Text("("));
                    }
                    self.push(Frame::Str(&cte.alias.name));
                }
                Frame::From(from) => {
                    if !from.joins.is_empty() {
                        self.push_list(&from.joins, " ", Frame::Join);
                        self.push(Frame::Text(" "));
                    }
                    self.push(Frame::Table(&from.relation));
                }
                Frame::Join(join) => {
                    self.push(Frame::Expression(&join.join_operator.constraint));
                    self.push(Frame::Text(" on "));
                    self.push(Frame::Table(&join.table));
                    self.push(Frame::Text(match join.join_operator.join_type {
                        JoinType::Inner => "join ",
                        JoinType::LeftOuter => "left outer join ",
                        JoinType::RightOuter => "right outer join ",
                        JoinType::FullOuter => "full outer join ",
                    }));
                }
                Frame::Table(table) => {
                    if let Some(binding) = &table.binding {
                        self.push(Frame::Str(binding));
                        self.push(Frame::Text(" "));
                    }
                    self.push_list(table.name.parts(), ".", |p| Frame::Str(p));
                }
                Frame::Assignment(assignment) => {
                    self.push(Frame::Expression(&assignment.value));
                    self.push(Frame::Text(" = "));
                    self.push(Frame::Str(&assignment.identifier));
                }
                Frame::Values(values) => {
                    self.push(Frame::Text(")"));
                    self.push_list(&values.values, ", ", Frame::Expression);
                    self.push(Frame::Text("values ("));
                }
                Frame::Window(window) => {
                    if !window.order_by.is_empty() {
                        self.push_list(&window.order_by, ", ", Frame::OrderBy);
                        self.push(Frame::Text("order by "));
                        if !window.partition_by.is_empty() {
                            self.push(Frame::Text(" "));
                        }
                    }
                    if !window.partition_by.is_empty() {
                        self.push_list(&window.partition_by, ", ", Frame::Expression);
                        self.push(Frame::Text("partition by "));
                    }
                }
                Frame::OrderBy(order_by) => {
                    if !order_by.ascending {
                        self.push(Frame::Text(" desc"));
                    }
                    self.push(Frame::Expression(&order_by.expression));
                }
                Frame::ConflictTarget(target) => {
                    match (target.columns.is_empty(), &target.constraint) {
                        (false, Some(_)) => {
                            return Err(Error::invalid_shape(
                                "conflict target has both columns and an 'on constraint' expression set",
                            ));
                        }
                        (false, None) => {
                            self.push(Frame::Text(")"));
                            self.push_list(&target.columns, ", ", |c| Frame::Str(c));
                            self.push(Frame::Text("("));
                        }
                        (true, Some(constraint)) => {
                            self.push(Frame::Str(constraint));
                            self.push(Frame::Text("on constraint "));
                        }
                        (true, None) => {}
                    }
                }
                Frame::ConflictAction(action) => match action {
                    ConflictAction::DoNothing => self.push(Frame::Text("do nothing")),
                    ConflictAction::DoUpdate(update) => {
                        if let Some(where_clause) = &update.where_clause {
                            self.push(Frame::Expression(where_clause));
                            self.push(Frame::Text(" where "));
                        }
                        if !update.assignments.is_empty() {
                            self.push_list(&update.assignments, ", ", Frame::Assignment);
                            self.push(Frame::Text(" set "));
                        }
                        self.push(Frame::Text("do update"));
                    }
                },
                Frame::MergeAction(action) => self.merge_action(action),
            }
        }

        Ok(FormattedQuery {
            value: self.output,
            parameters: IndexMap::new(),
        })
    }

    fn expression(&mut self, expression: &'a Expression) {
        match expression {
            Expression::Literal(literal) => write_literal(&mut self.output, literal),
            Expression::Identifier(name) => self.output.push_str(name),
            Expression::CompoundIdentifier(name) => {
                self.push_list(name.parts(), ".", |p| Frame::Str(p));
            }
            Expression::Operator(operator) => self.output.push_str(operator.as_str()),
            Expression::Wildcard => self.output.push('*'),
            Expression::Unary(unary) => {
                self.push(Frame::Expression(&unary.operand));
                self.push(Frame::Text(" "));
                self.push(Frame::Text(unary.operator.as_str()));
            }
            Expression::Binary(binary) => {
                self.push(Frame::Expression(&binary.right));
                self.push(Frame::Text(" "));
                self.push(Frame::Text(binary.operator.as_str()));
                self.push(Frame::Text(" "));
                self.push(Frame::Expression(&binary.left));
            }
            Expression::Parenthetical(inner) => {
                self.push(Frame::Text(")"));
                self.push(Frame::Expression(inner));
                self.push(Frame::Text("("));
            }
            Expression::FunctionCall(call) => {
                if let Some(window) = &call.over {
                    self.push(Frame::Text(")"));
                    self.push(Frame::Window(window));
                    self.push(Frame::Text(" over ("));
                }
                self.push(Frame::Text(")"));
                self.push_list(&call.parameters, ",", Frame::Expression);
                if call.distinct {
                    self.push(Frame::Text("distinct "));
                }
                self.push(Frame::Text("("));
                self.push(Frame::Str(&call.function));
            }
            Expression::ArrayLiteral(array) => {
                if let Some(type_hint) = array.type_hint {
                    self.push(Frame::Text(type_hint.as_str()));
                    self.push(Frame::Text("::"));
                }
                self.push(Frame::Text("]"));
                self.push_list(&array.values, ", ", Frame::Expression);
                self.push(Frame::Text("array["));
            }
        }
    }

    fn select(&mut self, select: &'a Select) {
        if let Some(having) = &select.having {
            self.push(Frame::Expression(having));
            self.push(Frame::Text(" having "));
        }
        if !select.group_by.is_empty() {
            self.push_list(&select.group_by, ", ", Frame::Expression);
            self.push(Frame::Text(" group by "));
        }
        if let Some(where_clause) = &select.where_clause {
            self.push(Frame::Expression(where_clause));
            self.push(Frame::Text(" where "));
        }
        if !select.from.is_empty() {
            self.push_list(&select.from, ", ", Frame::From);
            self.push(Frame::Text(" from "));
        }
        self.push_list(&select.projection, ", ", Frame::Expression);
        self.push(Frame::Text(if select.distinct {
            "select distinct "
        } else {
            "select "
        }));
    }

    fn merge_action(&mut self, action: &'a MergeAction) {
        let predicate = match action {
            MergeAction::MatchedUpdate {
                predicate,
                assignments,
            } => {
                self.push_list(assignments, ", ", Frame::Assignment);
                self.push(Frame::Text(" then update set "));
                predicate
            }
            MergeAction::MatchedDelete { predicate } => {
                self.push(Frame::Text(" then delete"));
                predicate
            }
            MergeAction::UnmatchedAction {
                predicate,
                columns,
                values,
            } => {
                self.push(Frame::Values(values));
                self.push(Frame::Text(") "));
                self.push_list(columns, ", ", |c| Frame::Str(c));
                self.push(Frame::Text(" then insert ("));
                predicate
            }
        };

        if let Some(predicate) = predicate {
            self.push(Frame::Expression(predicate));
            self.push(Frame::Text(" and "));
        }

        self.push(Frame::Text(match action {
            MergeAction::UnmatchedAction { .. } => "when not matched",
            MergeAction::MatchedUpdate { .. } | MergeAction::MatchedDelete { .. } => {
                "when matched"
            }
        }));
    }
}

fn write_literal(output: &mut String, literal: &Literal) {
    use std::fmt::Write;

    if literal.null {
        output.push_str("null");
    } else {
        match &literal.value {
            Value::String(text) => {
                output.push('\'');
                output.push_str(text);
                output.push('\'');
            }
            // Writing into a String cannot fail.
            other => {
                let _ = write!(output, "{other}");
            }
        }
    }

    if let Some(type_hint) = literal.type_hint {
        output.push_str("::");
        output.push_str(type_hint.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ArrayLiteral, CommonTableExpression, DataType, DoUpdate, FunctionCall, Insert, JoinOperator,
        Merge, OnConflict, Operator, SetOperation, SetOperator, TableAlias, Update, Delete, With,
    };
    use pgcypher_common::utils::error::ErrorKind;

    fn col(table: &str, column: &str) -> Expression {
        Expression::compound([table, column])
    }

    fn select_from(table: &str, binding: &str) -> Select {
        Select {
            projection: vec![Expression::Wildcard],
            from: vec![FromClause::new(
                TableReference::new(table).with_binding(binding),
            )],
            ..Select::default()
        }
    }

    fn query(select: Select) -> Statement {
        Statement::Query(Query::new(SetExpression::Select(Box::new(select))))
    }

    #[test]
    fn test_format_select_with_where() {
        let mut select = select_from("table", "t");
        select.where_clause = Some(Expression::binary(
            col("t", "col1"),
            Operator::GreaterThan,
            Expression::literal(1i64),
        ));

        let formatted = format_statement(&query(select)).unwrap();
        assert_eq!(formatted.value, "select * from table t where t.col1 > 1");
        assert!(formatted.parameters.is_empty());
    }

    #[test]
    fn test_format_literals() {
        let cases = vec![
            (Expression::literal("1234"), "'1234'"),
            (Expression::literal(-7i64), "-7"),
            (Expression::literal(u64::MAX), "18446744073709551615"),
            (Expression::literal(true), "true"),
            (Expression::literal(2.5f64), "2.5"),
            (Expression::Literal(Literal::null()), "null"),
            (
                Expression::Literal(Literal::new(Value::Int64(5)).with_type_hint(DataType::Int8)),
                "5::int8",
            ),
        ];

        for (expression, expected) in cases {
            assert_eq!(format_expression(&expression).unwrap().value, expected);
        }
    }

    #[test]
    fn test_format_property_lookup_and_negation() {
        let lookup = Expression::binary(
            col("s", "properties"),
            Operator::JsonField,
            Expression::literal("name"),
        );
        let expression = Expression::binary(
            Expression::unary(Operator::Not, lookup.clone()),
            Operator::And,
            Expression::Parenthetical(Box::new(Expression::binary(
                lookup,
                Operator::Equals,
                Expression::literal("x"),
            ))),
        );

        assert_eq!(
            format_expression(&expression).unwrap().value,
            "not s.properties -> 'name' and (s.properties -> 'name' = 'x')"
        );
    }

    #[test]
    fn test_format_ctes() {
        let cte = |name: &str, materialized| CommonTableExpression {
            alias: TableAlias::new(name),
            materialized,
            query: Query::new(SetExpression::Select(Box::new(select_from("node", name)))),
        };

        let statement = Statement::Query(Query {
            common_table_expressions: Some(With {
                recursive: true,
                expressions: vec![
                    cte("s", None),
                    CommonTableExpression {
                        alias: TableAlias {
                            name: "e".into(),
                            columns: vec!["id".into(), "kind".into()],
                        },
                        ..cte("e", Some(false))
                    },
                ],
            }),
            body: SetExpression::Select(Box::new(Select {
                projection: vec![Expression::Wildcard],
                from: vec![
                    FromClause::new(TableReference::new("s")),
                    FromClause::new(TableReference::new("e")),
                ],
                ..Select::default()
            })),
        });

        assert_eq!(
            format_statement(&statement).unwrap().value,
            "with recursive s as (select * from node s), e(id, kind) as not materialized \
             (select * from node e) select * from s, e"
        );
    }

    #[test]
    fn test_format_joins() {
        let mut select = select_from("node", "n");
        select.from[0].joins = vec![
            Join {
                table: TableReference::new("edge").with_binding("r"),
                join_operator: JoinOperator {
                    join_type: JoinType::Inner,
                    constraint: Expression::binary(
                        col("n", "id"),
                        Operator::Equals,
                        col("r", "start_id"),
                    ),
                },
            },
            Join {
                table: TableReference::new("node").with_binding("m"),
                join_operator: JoinOperator {
                    join_type: JoinType::LeftOuter,
                    constraint: Expression::binary(
                        col("m", "id"),
                        Operator::Equals,
                        col("r", "end_id"),
                    ),
                },
            },
        ];

        assert_eq!(
            format_statement(&query(select)).unwrap().value,
            "select * from node n join edge r on n.id = r.start_id \
             left outer join node m on m.id = r.end_id"
        );
    }

    #[test]
    fn test_format_select_clauses() {
        let select = Select {
            distinct: true,
            projection: vec![
                Expression::identifier("kind"),
                Expression::FunctionCall(FunctionCall {
                    distinct: true,
                    function: "count".into(),
                    parameters: vec![Expression::identifier("a"), Expression::identifier("b")],
                    over: None,
                }),
            ],
            from: vec![FromClause::new(TableReference::new("node"))],
            where_clause: None,
            group_by: vec![Expression::identifier("kind")],
            having: Some(Expression::binary(
                Expression::identifier("kind"),
                Operator::NotEquals,
                Expression::literal(0i64),
            )),
        };

        assert_eq!(
            format_statement(&query(select)).unwrap().value,
            "select distinct kind, count(distinct a,b) from node group by kind having kind != 0"
        );
    }

    #[test]
    fn test_format_window_and_array() {
        let call = Expression::FunctionCall(FunctionCall {
            distinct: false,
            function: "row_number".into(),
            parameters: Vec::new(),
            over: Some(Window {
                partition_by: vec![col("n", "kind")],
                order_by: vec![
                    OrderBy {
                        expression: col("n", "id"),
                        ascending: false,
                    },
                    OrderBy {
                        expression: col("n", "name"),
                        ascending: true,
                    },
                ],
            }),
        });
        assert_eq!(
            format_expression(&call).unwrap().value,
            "row_number() over (partition by n.kind order by n.id desc, n.name)"
        );

        let array = Expression::ArrayLiteral(ArrayLiteral {
            values: vec![Expression::literal(1i64), Expression::literal(2i64)],
            type_hint: Some(DataType::Int8Array),
        });
        assert_eq!(format_expression(&array).unwrap().value, "array[1, 2]::int8[]");
    }

    #[test]
    fn test_set_operation_all_and_distinct_is_rejected() {
        let operation = |all, distinct| {
            Statement::Query(Query::new(SetExpression::SetOperation(Box::new(SetOperation {
                operator: SetOperator::Union,
                left: SetExpression::Select(Box::new(select_from("node", "a"))),
                right: SetExpression::Select(Box::new(select_from("node", "b"))),
                all,
                distinct,
            }))))
        };

        assert_eq!(
            format_statement(&operation(true, false)).unwrap().value,
            "select * from node a union all select * from node b"
        );
        assert_eq!(
            format_statement(&operation(false, false)).unwrap().value,
            "select * from node a union select * from node b"
        );
        assert_eq!(
            format_statement(&operation(true, true)).unwrap_err().kind(),
            ErrorKind::InvalidExpressionShape
        );
    }

    #[test]
    fn test_format_insert_on_conflict() {
        let insert = |target: ConflictTarget| {
            Statement::Insert(Insert {
                table: TableReference::new("node"),
                columns: vec!["id".into(), "kind".into()],
                source: Some(Query::new(SetExpression::Values(Values {
                    values: vec![Expression::literal(1i64), Expression::literal("user")],
                }))),
                on_conflict: Some(OnConflict {
                    target: Some(target),
                    action: ConflictAction::DoUpdate(DoUpdate {
                        assignments: vec![
                            Assignment {
                                identifier: "kind".into(),
                                value: Expression::literal("user"),
                            },
                            Assignment {
                                identifier: "seen".into(),
                                value: Expression::literal(true),
                            },
                        ],
                        where_clause: Some(Expression::binary(
                            col("node", "id"),
                            Operator::Equals,
                            Expression::literal(1i64),
                        )),
                    }),
                }),
                returning: vec![Expression::identifier("id")],
            })
        };

        let columns = ConflictTarget {
            columns: vec!["id".into()],
            constraint: None,
        };
        assert_eq!(
            format_statement(&insert(columns)).unwrap().value,
            "insert into node (id, kind) values (1, 'user') on conflict (id) do update set \
             kind = 'user', seen = true where node.id = 1 returning id"
        );

        let constraint = ConflictTarget {
            columns: Vec::new(),
            constraint: Some("node_pkey".into()),
        };
        assert_eq!(
            format_statement(&insert(constraint)).unwrap().value,
            "insert into node (id, kind) values (1, 'user') on conflict on constraint node_pkey \
             do update set kind = 'user', seen = true where node.id = 1 returning id"
        );

        let both = ConflictTarget {
            columns: vec!["id".into()],
            constraint: Some("node_pkey".into()),
        };
        assert_eq!(
            format_statement(&insert(both)).unwrap_err().kind(),
            ErrorKind::InvalidExpressionShape
        );
    }

    #[test]
    fn test_format_do_nothing() {
        let statement = Statement::Insert(Insert {
            table: TableReference::new("edge"),
            columns: Vec::new(),
            source: Some(Query::new(SetExpression::Values(Values {
                values: vec![Expression::literal(1i64)],
            }))),
            on_conflict: Some(OnConflict {
                target: None,
                action: ConflictAction::DoNothing,
            }),
            returning: Vec::new(),
        });
        assert_eq!(
            format_statement(&statement).unwrap().value,
            "insert into edge values (1) on conflict do nothing"
        );
    }

    #[test]
    fn test_format_update_and_delete() {
        let predicate = Expression::binary(col("n", "id"), Operator::Equals, Expression::literal(3i64));
        let update = Statement::Update(Update {
            table: TableReference::new("node").with_binding("n"),
            assignments: vec![Assignment {
                identifier: "kind".into(),
                value: Expression::literal("group"),
            }],
            where_clause: Some(predicate.clone()),
        });
        assert_eq!(
            format_statement(&update).unwrap().value,
            "update node n set kind = 'group' where n.id = 3"
        );

        let delete = Statement::Delete(Delete {
            table: TableReference::new("node").with_binding("n"),
            where_clause: Some(predicate),
        });
        assert_eq!(
            format_statement(&delete).unwrap().value,
            "delete from node n where n.id = 3"
        );
    }

    #[test]
    fn test_format_merge() {
        let statement = Statement::Merge(Merge {
            into: true,
            table: TableReference::new("node").with_binding("n"),
            source: TableReference::new("staging").with_binding("s"),
            join_target: Expression::binary(col("n", "id"), Operator::Equals, col("s", "id")),
            actions: vec![
                MergeAction::MatchedUpdate {
                    predicate: Some(Expression::binary(
                        col("s", "deleted"),
                        Operator::Equals,
                        Expression::literal(false),
                    )),
                    assignments: vec![Assignment {
                        identifier: "kind".into(),
                        value: col("s", "kind"),
                    }],
                },
                MergeAction::MatchedDelete { predicate: None },
                MergeAction::UnmatchedAction {
                    predicate: None,
                    columns: vec!["id".into(), "kind".into()],
                    values: Values {
                        values: vec![col("s", "id"), col("s", "kind")],
                    },
                },
            ],
        });

        assert_eq!(
            format_statement(&statement).unwrap().value,
            "merge into node n using staging s on n.id = s.id \
             when matched and s.deleted = false then update set kind = s.kind \
             when matched then delete \
             when not matched then insert (id, kind) values (s.id, s.kind)"
        );
    }

    #[test]
    fn test_format_deep_expression_iteratively() {
        let mut expression = Expression::identifier("x");
        for _ in 0..10_000 {
            expression = Expression::unary(Operator::Not, expression);
        }
        let formatted = format_expression(&expression).unwrap();
        assert!(formatted.value.starts_with("not not not"));
        assert!(formatted.value.ends_with(" x"));
    }
}
