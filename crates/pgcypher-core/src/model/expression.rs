//! Relational expressions.

use std::fmt;

use pgcypher_common::types::Value;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::SyntaxNode;

/// An expression in the relational tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value.
    Literal(Literal),
    /// A bare name (`s`).
    Identifier(String),
    /// A dotted name (`s.properties`).
    CompoundIdentifier(CompoundIdentifier),
    /// A symbolic operator token. Only appears as a standalone expression
    /// while a tree is under construction.
    Operator(Operator),
    /// `<operator> <operand>`.
    Unary(Box<UnaryExpression>),
    /// `<left> <operator> <right>`.
    Binary(Box<BinaryExpression>),
    /// `(<expression>)`.
    Parenthetical(Box<Expression>),
    /// A function call.
    FunctionCall(FunctionCall),
    /// `array[...]`.
    ArrayLiteral(ArrayLiteral),
    /// `*`.
    Wildcard,
}

impl Expression {
    /// Creates an identifier expression.
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    /// Creates a compound identifier expression from its parts.
    pub fn compound<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expression::CompoundIdentifier(CompoundIdentifier::from_parts(parts))
    }

    /// Creates a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(Literal::new(value.into()))
    }

    /// Creates a unary expression.
    pub fn unary(operator: Operator, operand: Expression) -> Self {
        Expression::Unary(Box::new(UnaryExpression { operator, operand }))
    }

    /// Creates a binary expression.
    pub fn binary(left: Expression, operator: Operator, right: Expression) -> Self {
        Expression::Binary(Box::new(BinaryExpression {
            left,
            operator,
            right,
        }))
    }

    /// Conjoins the given expressions into a right-leaning `and` chain.
    ///
    /// `[a, b, c]` becomes `a and (b and c)`. Returns `None` for an empty
    /// input.
    pub fn conjoin(expressions: impl IntoIterator<Item = Expression>) -> Option<Self> {
        let mut items: Vec<Expression> = expressions.into_iter().collect();
        let mut acc = items.pop()?;
        while let Some(next) = items.pop() {
            acc = Expression::binary(next, Operator::And, acc);
        }
        Some(acc)
    }
}

impl Drop for Expression {
    /// Drops nested operands from a work list so that arbitrarily deep trees
    /// do not exhaust the stack.
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_operands(&mut pending);
        while let Some(mut expression) = pending.pop() {
            expression.take_operands(&mut pending);
        }
    }
}

impl Expression {
    /// Moves every directly nested expression into `out`, leaving wildcards
    /// in their place.
    fn take_operands(&mut self, out: &mut Vec<Expression>) {
        match self {
            Expression::Unary(unary) => {
                out.push(std::mem::replace(&mut unary.operand, Expression::Wildcard));
            }
            Expression::Binary(binary) => {
                out.push(std::mem::replace(&mut binary.left, Expression::Wildcard));
                out.push(std::mem::replace(&mut binary.right, Expression::Wildcard));
            }
            Expression::Parenthetical(inner) => {
                out.push(std::mem::replace(inner.as_mut(), Expression::Wildcard));
            }
            Expression::FunctionCall(call) => {
                out.append(&mut call.parameters);
                if let Some(window) = &mut call.over {
                    out.append(&mut window.partition_by);
                    out.extend(
                        window
                            .order_by
                            .iter_mut()
                            .map(|item| std::mem::replace(&mut item.expression, Expression::Wildcard)),
                    );
                }
            }
            Expression::ArrayLiteral(array) => out.append(&mut array.values),
            Expression::Literal(_)
            | Expression::Identifier(_)
            | Expression::CompoundIdentifier(_)
            | Expression::Operator(_)
            | Expression::Wildcard => {}
        }
    }
}

impl SyntaxNode for Expression {
    fn node_type(&self) -> &'static str {
        match self {
            Expression::Literal(_) => "literal",
            Expression::Identifier(_) => "identifier",
            Expression::CompoundIdentifier(_) => "compound_identifier",
            Expression::Operator(_) => "operator",
            Expression::Unary(_) => "unary_expression",
            Expression::Binary(_) => "binary_expression",
            Expression::Parenthetical(_) => "parenthetical",
            Expression::FunctionCall(_) => "function_call",
            Expression::ArrayLiteral(_) => "array_literal",
            Expression::Wildcard => "wildcard",
        }
    }
}

/// A literal value with its null flag and optional type cast.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Literal {
    /// The value.
    pub value: Value,
    /// Set when the literal is SQL `null`.
    pub null: bool,
    /// Printed as a `::type` cast when present.
    pub type_hint: Option<DataType>,
}

impl Literal {
    /// Creates a literal from a value. A [`Value::Null`] sets the null flag.
    pub fn new(value: Value) -> Self {
        let null = value.is_null();
        Self {
            value,
            null,
            type_hint: None,
        }
    }

    /// Creates a null literal.
    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    /// Sets the type hint.
    pub fn with_type_hint(mut self, type_hint: DataType) -> Self {
        self.type_hint = Some(type_hint);
        self
    }
}

/// A dotted name, e.g. `s.properties`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CompoundIdentifier(SmallVec<[String; 3]>);

impl CompoundIdentifier {
    /// Creates a compound identifier from its parts.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// The first part, i.e. the qualifier the rest hangs off.
    pub fn root(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// All parts in order.
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no parts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CompoundIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// `<operator> <operand>`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    /// Operator.
    pub operator: Operator,
    /// Operand.
    pub operand: Expression,
}

/// `<left> <operator> <right>`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    /// Left operand.
    pub left: Expression,
    /// Operator.
    pub operator: Operator,
    /// Right operand.
    pub right: Expression,
}

/// A function call, optionally windowed.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// `f(distinct ...)`.
    pub distinct: bool,
    /// Function name.
    pub function: String,
    /// Arguments.
    pub parameters: Vec<Expression>,
    /// `over (...)` clause.
    pub over: Option<Window>,
}

/// A window definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Window {
    /// `partition by` expressions.
    pub partition_by: Vec<Expression>,
    /// `order by` items.
    pub order_by: Vec<OrderBy>,
}

/// One `order by` item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Sort key.
    pub expression: Expression,
    /// `false` prints `desc`.
    pub ascending: bool,
}

/// `array[...]::type`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayLiteral {
    /// Elements.
    pub values: Vec<Expression>,
    /// Cast applied to the whole array.
    pub type_hint: Option<DataType>,
}

/// Relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `=`
    Equals,
    /// `!=`
    NotEquals,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqualTo,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqualTo,
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
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
    /// `||`
    Concatenate,
    /// `->`
    JsonField,
    /// `->>`
    JsonFieldText,
    /// `like`
    Like,
    /// `ilike`
    ILike,
    /// `is`
    Is,
    /// `is not`
    IsNot,
    /// `in`
    In,
}

impl Operator {
    /// The operator's SQL spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqualTo => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqualTo => ">=",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Power => "^",
            Operator::Concatenate => "||",
            Operator::JsonField => "->",
            Operator::JsonFieldText => "->>",
            Operator::Like => "like",
            Operator::ILike => "ilike",
            Operator::Is => "is",
            Operator::IsNot => "is not",
            Operator::In => "in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PostgreSQL types usable as a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// `bool`
    Boolean,
    /// `int2`
    Int2,
    /// `int4`
    Int4,
    /// `int8`
    Int8,
    /// `float4`
    Float4,
    /// `float8`
    Float8,
    /// `numeric`
    Numeric,
    /// `text`
    Text,
    /// `jsonb`
    Jsonb,
    /// `int4[]`
    Int4Array,
    /// `int8[]`
    Int8Array,
    /// `text[]`
    TextArray,
}

impl DataType {
    /// The type's SQL spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            DataType::Boolean => "bool",
            DataType::Int2 => "int2",
            DataType::Int4 => "int4",
            DataType::Int8 => "int8",
            DataType::Float4 => "float4",
            DataType::Float8 => "float8",
            DataType::Numeric => "numeric",
            DataType::Text => "text",
            DataType::Jsonb => "jsonb",
            DataType::Int4Array => "int4[]",
            DataType::Int8Array => "int8[]",
            DataType::TextArray => "text[]",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conjoin_is_right_leaning() {
        let chain = Expression::conjoin(vec![
            Expression::identifier("a"),
            Expression::identifier("b"),
            Expression::identifier("c"),
        ])
        .unwrap();

        let Expression::Binary(outer) = &chain else {
            panic!("Expected binary expression");
        };
        assert_eq!(outer.left, Expression::identifier("a"));
        assert_eq!(outer.operator, Operator::And);
        if let Expression::Binary(inner) = &outer.right {
            assert_eq!(inner.left, Expression::identifier("b"));
            assert_eq!(inner.right, Expression::identifier("c"));
        } else {
            panic!("Expected nested binary expression");
        }
    }

    #[test]
    fn test_conjoin_edges() {
        assert!(Expression::conjoin(Vec::new()).is_none());
        assert_eq!(
            Expression::conjoin(vec![Expression::Wildcard]),
            Some(Expression::Wildcard)
        );
    }

    #[test]
    fn test_compound_identifier_root() {
        let id = CompoundIdentifier::from_parts(["s", "properties"]);
        assert_eq!(id.root(), Some("s"));
        assert_eq!(id.to_string(), "s.properties");
        assert_eq!(id.len(), 2);
    }

    #[test]
    fn test_null_literal_flag() {
        assert!(Literal::null().null);
        assert!(!Literal::new(Value::Int64(1)).null);
    }

    #[test]
    fn test_drop_deep_trees() {
        let mut chain = Expression::identifier("x");
        for i in 0..200_000 {
            chain = Expression::binary(chain, Operator::Add, Expression::literal(Value::Int64(i)));
        }
        drop(chain);

        let mut nested = Expression::identifier("y");
        for _ in 0..200_000 {
            nested = Expression::Parenthetical(Box::new(Expression::unary(Operator::Not, nested)));
        }
        drop(nested);

        let call = Expression::FunctionCall(FunctionCall {
            distinct: false,
            function: "f".to_string(),
            parameters: vec![Expression::identifier("a")],
            over: Some(Window {
                partition_by: vec![Expression::identifier("b")],
                order_by: vec![OrderBy {
                    expression: Expression::identifier("c"),
                    ascending: true,
                }],
            }),
        });
        drop(call);
    }
}
