//! Cypher expression to relational expression translation.
//!
//! The translator is a [`HierarchicalVisitor`] over the Cypher walk. Leaves
//! push finished nodes onto a [`TreeBuilder`] stack; interior nodes pop their
//! operands back off and assemble them:
//!
//! - comparison and arithmetic chains open a fresh binary node before every
//!   link, with the value accumulated so far as its left operand, so
//!   `a + b - c` becomes `(a + b) - c`,
//! - conjunctions and disjunctions grow a right-leaning chain through
//!   [`TreeBuilder::continue_binary_expression`], so `a and b and c` becomes
//!   `a and (b and c)`,
//! - property lookups become JSON field chains over the properties column.

use pgcypher_adapters::query::cypher::ast;
use pgcypher_adapters::query::cypher::walk::{self as cypher_walk, CypherNode};
use pgcypher_common::types::Value;
use pgcypher_common::utils::error::{Error, Result};
use pgcypher_core::model::{CompoundIdentifier, Literal, Operator, SyntaxNode};
use pgcypher_core::tree::{ExprId, ExpressionTree, NodeKind, TreeBuilder};
use pgcypher_core::walk::{HierarchicalVisitor, walk};

use crate::config::Config;

/// Translates a Cypher expression into a fresh arena, returning the arena
/// and the root of the translated expression.
pub(crate) fn translate_to_tree(
    expression: &ast::Expression,
    config: &Config,
) -> Result<(ExpressionTree, ExprId)> {
    let mut translator = ExpressionTranslator::new(config);
    walk(
        CypherNode::Expression(expression),
        &mut translator,
        cypher_walk::cursor,
    )?;
    translator.builder.finish()
}

struct ExpressionTranslator<'c> {
    config: &'c Config,
    builder: TreeBuilder,
    /// Builder depth below each open conjunction or disjunction root.
    chains: Vec<usize>,
}

impl<'c> ExpressionTranslator<'c> {
    fn new(config: &'c Config) -> Self {
        Self {
            config,
            builder: TreeBuilder::new(),
            chains: Vec::new(),
        }
    }

    fn push(&mut self, kind: NodeKind) {
        let id = self.builder.add(kind);
        self.builder.push(id);
    }

    /// Wraps the top of the stack in a node with a single slot.
    fn wrap(&mut self, kind: NodeKind, operator: Option<Operator>) -> Result<()> {
        let operand = self.builder.pop()?;
        self.push(kind);
        if let Some(operator) = operator {
            let op = self.builder.add_operator(operator);
            self.builder.assign(op)?;
        }
        self.builder.assign(operand)
    }

    fn property_lookup(&mut self, lookup: &ast::PropertyLookup) -> Result<()> {
        let ast::Expression::Variable(binding) = lookup.atom.as_ref() else {
            return Err(Error::missing_binding(format!(
                "property lookup on {} does not name a binding",
                lookup.atom.node_type()
            )));
        };

        let mut current = self.builder.add(NodeKind::CompoundIdentifier(
            CompoundIdentifier::from_parts([
                binding.as_str(),
                self.config.properties_column.as_str(),
            ]),
        ));

        for symbol in &lookup.symbols {
            self.push(NodeKind::binary());
            self.builder.assign(current)?;
            let op = self.builder.add_operator(Operator::JsonField);
            self.builder.assign(op)?;
            let key = self
                .builder
                .add(NodeKind::Literal(Literal::new(Value::String(symbol.clone()))));
            self.builder.assign(key)?;
            current = self.builder.pop()?;
        }

        self.builder.push(current);
        Ok(())
    }

    fn close_chain(&mut self, operator: Operator) -> Result<()> {
        let operand = self.builder.pop()?;
        self.builder.continue_binary_expression(operator, operand)?;
        let depth = self
            .chains
            .pop()
            .ok_or_else(|| Error::Internal("unbalanced boolean chain".to_string()))?;
        // Drop any nested tails so the chain root is back on top.
        self.builder.ascend(depth + 1)
    }
}

impl<'a> HierarchicalVisitor<CypherNode<'a>> for ExpressionTranslator<'_> {
    fn enter(&mut self, node: CypherNode<'a>) -> Result<()> {
        if let CypherNode::Expression(
            ast::Expression::Conjunction(operands) | ast::Expression::Disjunction(operands),
        ) = node
        {
            if operands.len() < 2 {
                return Err(Error::invalid_shape(format!(
                    "{} needs at least two operands, found {}",
                    node.node_type(),
                    operands.len()
                )));
            }
            self.chains.push(self.builder.depth());
            self.push(NodeKind::binary());
        }
        Ok(())
    }

    fn visit(&mut self, node: CypherNode<'a>) -> Result<()> {
        let CypherNode::Expression(expression) = node else {
            return Ok(());
        };

        match expression {
            ast::Expression::Conjunction(_) => {
                let operand = self.builder.pop()?;
                self.builder.continue_binary_expression(Operator::And, operand)
            }
            ast::Expression::Disjunction(_) => {
                let operand = self.builder.pop()?;
                self.builder.continue_binary_expression(Operator::Or, operand)
            }
            // Before each link: the accumulated value becomes the left
            // operand of a new binary node.
            ast::Expression::Comparison(_) | ast::Expression::Arithmetic(_) => {
                let left = self.builder.pop()?;
                self.push(NodeKind::binary());
                self.builder.assign(left)
            }
            _ => Ok(()),
        }
    }

    fn exit(&mut self, node: CypherNode<'a>) -> Result<()> {
        let expression = match node {
            CypherNode::Operator(operator) => {
                let op = self.builder.add_operator(sql_operator(operator));
                return self.builder.assign(op);
            }
            CypherNode::Partial(_) => {
                let right = self.builder.pop()?;
                return self.builder.assign(right);
            }
            CypherNode::Expression(expression) => expression,
        };

        match expression {
            ast::Expression::Literal(literal) => {
                self.push(NodeKind::Literal(sql_literal(literal)));
                Ok(())
            }
            ast::Expression::Variable(name) => {
                self.push(NodeKind::Identifier(name.clone()));
                Ok(())
            }
            ast::Expression::PropertyLookup(lookup) => self.property_lookup(lookup),
            ast::Expression::Negation(_) => self.wrap(NodeKind::unary(), Some(Operator::Not)),
            ast::Expression::Parenthetical(_) => {
                self.wrap(NodeKind::Parenthetical { inner: None }, None)
            }
            ast::Expression::Conjunction(_) => self.close_chain(Operator::And),
            ast::Expression::Disjunction(_) => self.close_chain(Operator::Or),
            // The last link already filled the binary node on top.
            ast::Expression::Comparison(_) | ast::Expression::Arithmetic(_) => Ok(()),
            ast::Expression::Parameter(_)
            | ast::Expression::FunctionInvocation { .. }
            | ast::Expression::List(_) => {
                Err(Error::unsupported(expression.node_type(), "expression translation"))
            }
        }
    }
}

const fn sql_operator(operator: ast::Operator) -> Operator {
    match operator {
        ast::Operator::Equals => Operator::Equals,
        ast::Operator::NotEquals => Operator::NotEquals,
        ast::Operator::LessThan => Operator::LessThan,
        ast::Operator::LessThanOrEqualTo => Operator::LessThanOrEqualTo,
        ast::Operator::GreaterThan => Operator::GreaterThan,
        ast::Operator::GreaterThanOrEqualTo => Operator::GreaterThanOrEqualTo,
        ast::Operator::Add => Operator::Add,
        ast::Operator::Subtract => Operator::Subtract,
        ast::Operator::Multiply => Operator::Multiply,
        ast::Operator::Divide => Operator::Divide,
        ast::Operator::Modulo => Operator::Modulo,
        ast::Operator::Power => Operator::Power,
    }
}

/// Cypher string literals arrive with their quotes; SQL literals carry the
/// bare text.
fn sql_literal(literal: &ast::Literal) -> Literal {
    if literal.null {
        return Literal::null();
    }
    match &literal.value {
        Value::String(text) => Literal::new(Value::String(unquote(text).to_string())),
        value => Literal::new(value.clone()),
    }
}

fn unquote(text: &str) -> &str {
    ['\'', '"']
        .into_iter()
        .find_map(|quote| {
            text.strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(text)
}
