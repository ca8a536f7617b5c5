//! Walk cursors over Cypher expressions.
//!
//! Adapts [`Expression`] to the generic walk engine in
//! [`pgcypher_core::walk`]. Chains (comparison and arithmetic) yield their
//! head operand followed by one [`CypherNode::Partial`] per link, and each
//! partial yields its operator before its right operand, so a visitor sees
//! the operator of a link before the value it applies to.

use pgcypher_common::utils::error::{Error, Result};
use pgcypher_core::model::SyntaxNode;
use pgcypher_core::walk::WalkCursor;

use super::ast::{Expression, Operator, Partial};

/// A position in a Cypher expression tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CypherNode<'a> {
    /// An expression.
    Expression(&'a Expression),
    /// One link of a comparison or arithmetic chain.
    Partial(&'a Partial),
    /// The operator of a partial.
    Operator(Operator),
}

impl SyntaxNode for CypherNode<'_> {
    fn node_type(&self) -> &'static str {
        match self {
            CypherNode::Expression(expression) => expression.node_type(),
            CypherNode::Partial(_) => "partial",
            CypherNode::Operator(_) => "operator",
        }
    }
}

/// Lists the children of `node`.
///
/// Property lookups are leaves: their atom and symbols are read directly by
/// the visitor.
///
/// # Errors
///
/// Fails with [`Error::UnsupportedConstruct`] for parameters, function
/// invocations and list literals.
pub fn cursor(node: CypherNode<'_>) -> Result<WalkCursor<CypherNode<'_>>> {
    let expression = match node {
        CypherNode::Expression(expression) => expression,
        CypherNode::Partial(partial) => {
            return Ok(WalkCursor::new(
                node,
                vec![
                    CypherNode::Operator(partial.operator),
                    CypherNode::Expression(&partial.right),
                ],
            ));
        }
        CypherNode::Operator(_) => return Ok(WalkCursor::leaf(node)),
    };

    let branches = match expression {
        Expression::Literal(_) | Expression::Variable(_) | Expression::PropertyLookup(_) => {
            Vec::new()
        }
        Expression::Negation(inner) | Expression::Parenthetical(inner) => {
            vec![CypherNode::Expression(inner)]
        }
        Expression::Conjunction(operands) | Expression::Disjunction(operands) => {
            operands.iter().map(CypherNode::Expression).collect()
        }
        Expression::Comparison(chain) | Expression::Arithmetic(chain) => {
            std::iter::once(CypherNode::Expression(&*chain.left))
                .chain(chain.partials.iter().map(CypherNode::Partial))
                .collect()
        }
        Expression::Parameter(_)
        | Expression::FunctionInvocation { .. }
        | Expression::List(_) => {
            return Err(Error::unsupported(expression.node_type(), "cypher expression"));
        }
    };

    Ok(WalkCursor::new(node, branches))
}
