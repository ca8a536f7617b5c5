//! Arena-backed expression tree.
//!
//! Translation and fragmentation build and restructure expressions in place.
//! Nodes live in a flat arena and refer to each other by [`ExprId`], with a
//! parent link per node, so detaching a subtree from its parent or grafting
//! it under another node is a couple of index writes.
//!
//! Unary and binary nodes have fillable slots that start empty. A filled
//! slot is never overwritten through [`ExpressionTree::assign`]; doing so
//! fails with [`Error::SlotAlreadyAssigned`].
//!
//! Trees convert to and from the owned [`Expression`] model with
//! [`ExpressionTree::import`] and [`ExpressionTree::export`]; both are
//! iterative.

mod builder;

pub use builder::TreeBuilder;

use pgcypher_common::utils::error::{Error, Result, Slot};

use crate::model::{CompoundIdentifier, Expression, Literal, Operator};
use crate::walk::WalkCursor;

/// Handle to a node in an [`ExpressionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    /// The arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of an arena node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A literal.
    Literal(Literal),
    /// A bare name.
    Identifier(String),
    /// A dotted name.
    CompoundIdentifier(CompoundIdentifier),
    /// An operator token occupying an operator slot.
    Operator(Operator),
    /// `<operator> <operand>` with fillable slots.
    Unary {
        /// Operator slot.
        operator: Option<ExprId>,
        /// Operand slot.
        operand: Option<ExprId>,
    },
    /// `<left> <operator> <right>` with fillable slots.
    Binary {
        /// Left operand slot.
        left: Option<ExprId>,
        /// Operator slot.
        operator: Option<ExprId>,
        /// Right operand slot.
        right: Option<ExprId>,
    },
    /// `(<inner>)`.
    Parenthetical {
        /// Inner expression slot.
        inner: Option<ExprId>,
    },
    /// A leaf carried through unchanged (function calls, arrays, wildcards).
    Opaque(Expression),
}

impl NodeKind {
    /// An empty binary node.
    pub const fn binary() -> Self {
        NodeKind::Binary {
            left: None,
            operator: None,
            right: None,
        }
    }

    /// An empty unary node.
    pub const fn unary() -> Self {
        NodeKind::Unary {
            operator: None,
            operand: None,
        }
    }

    /// Node-type tag, matching the one of the equivalent [`Expression`].
    pub fn node_type(&self) -> &'static str {
        use crate::model::SyntaxNode;

        match self {
            NodeKind::Literal(_) => "literal",
            NodeKind::Identifier(_) => "identifier",
            NodeKind::CompoundIdentifier(_) => "compound_identifier",
            NodeKind::Operator(_) => "operator",
            NodeKind::Unary { .. } => "unary_expression",
            NodeKind::Binary { .. } => "binary_expression",
            NodeKind::Parenthetical { .. } => "parenthetical",
            NodeKind::Opaque(expression) => expression.node_type(),
        }
    }
}

#[derive(Debug, Clone)]
struct TreeNode {
    kind: NodeKind,
    parent: Option<ExprId>,
}

/// Flat arena of expression nodes.
#[derive(Debug, Clone, Default)]
pub struct ExpressionTree {
    nodes: Vec<TreeNode>,
}

impl ExpressionTree {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever added.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node was ever added.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a detached node.
    pub fn add(&mut self, kind: NodeKind) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(TreeNode { kind, parent: None });
        id
    }

    /// Adds an operator node.
    pub fn add_operator(&mut self, operator: Operator) -> ExprId {
        self.add(NodeKind::Operator(operator))
    }

    /// The payload of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this arena.
    pub fn kind(&self, id: ExprId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// The node currently holding `id` in one of its slots.
    pub fn parent(&self, id: ExprId) -> Option<ExprId> {
        self.nodes[id.index()].parent
    }

    /// Returns the operator held by `id`, if it is an operator node.
    pub fn operator(&self, id: ExprId) -> Option<Operator> {
        match self.kind(id) {
            NodeKind::Operator(operator) => Some(*operator),
            _ => None,
        }
    }

    /// Returns the operator in the operator slot of a binary or unary node.
    pub fn operator_of(&self, id: ExprId) -> Option<Operator> {
        match self.kind(id) {
            NodeKind::Binary { operator, .. } | NodeKind::Unary { operator, .. } => {
                operator.and_then(|op| self.operator(op))
            }
            _ => None,
        }
    }

    /// Fills the next free slot of `target` with `child`.
    ///
    /// Operators go to the operator slot. Other nodes go to the operand slot
    /// of a unary node, or to the left and then the right operand slot of a
    /// binary node. Writing a slot that is already filled fails with
    /// [`Error::SlotAlreadyAssigned`].
    pub fn assign(&mut self, target: ExprId, child: ExprId) -> Result<()> {
        let is_operator = matches!(self.kind(child), NodeKind::Operator(_));

        match &mut self.nodes[target.index()].kind {
            NodeKind::Unary { operator, operand } => {
                let (slot, kind) = if is_operator {
                    (operator, Slot::Operator)
                } else {
                    (operand, Slot::Operand)
                };
                if slot.is_some() {
                    return Err(Error::SlotAlreadyAssigned(kind));
                }
                *slot = Some(child);
            }
            NodeKind::Binary {
                left,
                operator,
                right,
            } => {
                if is_operator {
                    if operator.is_some() {
                        return Err(Error::SlotAlreadyAssigned(Slot::Operator));
                    }
                    *operator = Some(child);
                } else if left.is_none() {
                    *left = Some(child);
                } else if right.is_none() {
                    *right = Some(child);
                } else {
                    return Err(Error::SlotAlreadyAssigned(Slot::Operand));
                }
            }
            NodeKind::Parenthetical { inner } => {
                if inner.is_some() {
                    return Err(Error::SlotAlreadyAssigned(Slot::Operand));
                }
                *inner = Some(child);
            }
            other => {
                return Err(Error::unsupported(other.node_type(), "assignment target"));
            }
        }

        self.nodes[child.index()].parent = Some(target);
        Ok(())
    }

    /// Removes `id` from its parent's slot, leaving that slot empty.
    ///
    /// A node without a parent is left as is.
    pub fn detach(&mut self, id: ExprId) -> Result<()> {
        let Some(parent) = self.nodes[id.index()].parent.take() else {
            return Ok(());
        };

        let slot = match &mut self.nodes[parent.index()].kind {
            NodeKind::Unary { operator, operand } => [operator, operand]
                .into_iter()
                .find(|slot| **slot == Some(id)),
            NodeKind::Binary {
                left,
                operator,
                right,
            } => [left, operator, right]
                .into_iter()
                .find(|slot| **slot == Some(id)),
            NodeKind::Parenthetical { inner } => (*inner == Some(id)).then_some(inner),
            _ => None,
        };

        match slot {
            Some(slot) => {
                *slot = None;
                Ok(())
            }
            None => Err(Error::Internal(format!(
                "node {} is not held by its recorded parent",
                id.index()
            ))),
        }
    }

    /// Adds `operand` to the right-leaning `operator` chain whose current
    /// tail is `target`, returning the new tail.
    ///
    /// The operator slot is filled if empty, then the left and the right
    /// operand slots. Once both are full, the right operand is moved into a
    /// fresh binary node together with `operand`; that node takes the right
    /// slot and becomes the new tail.
    pub fn continue_binary_expression(
        &mut self,
        target: ExprId,
        operator: Operator,
        operand: ExprId,
    ) -> Result<ExprId> {
        let (has_operator, left, right) = match self.kind(target) {
            NodeKind::Binary {
                left,
                operator,
                right,
            } => (operator.is_some(), *left, *right),
            other => {
                return Err(Error::unsupported(
                    other.node_type(),
                    "continuing a binary expression",
                ));
            }
        };

        if !has_operator {
            let op = self.add_operator(operator);
            self.assign(target, op)?;
        }

        match (left, right) {
            (None, _) | (Some(_), None) => {
                self.assign(target, operand)?;
                Ok(target)
            }
            (Some(_), Some(previous)) => {
                let nested = self.add(NodeKind::binary());
                self.detach(previous)?;
                self.assign(nested, previous)?;
                let op = self.add_operator(operator);
                self.assign(nested, op)?;
                self.assign(nested, operand)?;
                self.assign(target, nested)?;
                Ok(nested)
            }
        }
    }

    /// Joins two trees with `and`, returning the new root.
    pub fn conjoin(&mut self, left: ExprId, right: ExprId) -> Result<ExprId> {
        let root = self.add(NodeKind::binary());
        self.assign(root, left)?;
        let op = self.add_operator(Operator::And);
        self.assign(root, op)?;
        self.assign(root, right)?;
        Ok(root)
    }

    /// Walk cursor for `id`.
    ///
    /// Binary nodes yield `[left, operator, right]`, unary nodes
    /// `[operator, operand]`, parentheticals their inner expression, and
    /// leaves nothing. Empty slots are skipped.
    pub fn cursor(&self, id: ExprId) -> Result<WalkCursor<ExprId>> {
        let branches = match self.kind(id) {
            NodeKind::Binary {
                left,
                operator,
                right,
            } => [*left, *operator, *right].into_iter().flatten().collect(),
            NodeKind::Unary { operator, operand } => {
                [*operator, *operand].into_iter().flatten().collect()
            }
            NodeKind::Parenthetical { inner } => inner.iter().copied().collect(),
            NodeKind::Literal(_)
            | NodeKind::Identifier(_)
            | NodeKind::CompoundIdentifier(_)
            | NodeKind::Operator(_)
            | NodeKind::Opaque(_) => Vec::new(),
        };
        Ok(WalkCursor::new(id, branches))
    }

    /// Copies an owned expression into the arena, returning its root.
    pub fn import(&mut self, expression: &Expression) -> Result<ExprId> {
        let mut root = None;
        let mut work: Vec<(&Expression, Option<ExprId>)> = vec![(expression, None)];

        while let Some((next, parent)) = work.pop() {
            let id = match next {
                Expression::Literal(literal) => self.add(NodeKind::Literal(literal.clone())),
                Expression::Identifier(name) => self.add(NodeKind::Identifier(name.clone())),
                Expression::CompoundIdentifier(name) => {
                    self.add(NodeKind::CompoundIdentifier(name.clone()))
                }
                Expression::Operator(operator) => self.add_operator(*operator),
                Expression::Unary(unary) => {
                    let id = self.add(NodeKind::unary());
                    let op = self.add_operator(unary.operator);
                    self.assign(id, op)?;
                    work.push((&unary.operand, Some(id)));
                    id
                }
                Expression::Binary(binary) => {
                    let id = self.add(NodeKind::binary());
                    let op = self.add_operator(binary.operator);
                    self.assign(id, op)?;
                    // Left is popped, and so assigned, first.
                    work.push((&binary.right, Some(id)));
                    work.push((&binary.left, Some(id)));
                    id
                }
                Expression::Parenthetical(inner) => {
                    let id = self.add(NodeKind::Parenthetical { inner: None });
                    work.push((inner, Some(id)));
                    id
                }
                Expression::FunctionCall(_) | Expression::ArrayLiteral(_) | Expression::Wildcard => {
                    self.add(NodeKind::Opaque(next.clone()))
                }
            };

            match parent {
                Some(parent) => self.assign(parent, id)?,
                None => root = Some(id),
            }
        }

        root.ok_or_else(|| Error::Internal("import produced no root".to_string()))
    }

    /// Builds an owned expression from the subtree rooted at `root`.
    ///
    /// Fails with [`Error::InvalidExpressionShape`] if a slot is still empty
    /// or an operator slot holds something other than an operator.
    pub fn export(&self, root: ExprId) -> Result<Expression> {
        let mut work = vec![(root, false)];
        let mut values: Vec<Expression> = Vec::new();

        while let Some((id, children_done)) = work.pop() {
            match self.kind(id) {
                NodeKind::Literal(literal) => values.push(Expression::Literal(literal.clone())),
                NodeKind::Identifier(name) => values.push(Expression::Identifier(name.clone())),
                NodeKind::CompoundIdentifier(name) => {
                    values.push(Expression::CompoundIdentifier(name.clone()));
                }
                NodeKind::Operator(operator) => values.push(Expression::Operator(*operator)),
                NodeKind::Opaque(expression) => values.push(expression.clone()),
                NodeKind::Unary { operator, operand } => {
                    if children_done {
                        let operand = pop_value(&mut values)?;
                        let operator = self.slot_operator(*operator, id)?;
                        values.push(Expression::unary(operator, operand));
                    } else {
                        let operand = self.required(*operand, id, "operand")?;
                        work.push((id, true));
                        work.push((operand, false));
                    }
                }
                NodeKind::Binary {
                    left,
                    operator,
                    right,
                } => {
                    if children_done {
                        let right = pop_value(&mut values)?;
                        let left = pop_value(&mut values)?;
                        let operator = self.slot_operator(*operator, id)?;
                        values.push(Expression::binary(left, operator, right));
                    } else {
                        let left = self.required(*left, id, "left operand")?;
                        let right = self.required(*right, id, "right operand")?;
                        work.push((id, true));
                        work.push((right, false));
                        work.push((left, false));
                    }
                }
                NodeKind::Parenthetical { inner } => {
                    if children_done {
                        let inner = pop_value(&mut values)?;
                        values.push(Expression::Parenthetical(Box::new(inner)));
                    } else {
                        let inner = self.required(*inner, id, "inner expression")?;
                        work.push((id, true));
                        work.push((inner, false));
                    }
                }
            }
        }

        match (values.pop(), values.is_empty()) {
            (Some(expression), true) => Ok(expression),
            _ => Err(Error::Internal(
                "export left an unbalanced value stack".to_string(),
            )),
        }
    }

    fn required(&self, slot: Option<ExprId>, owner: ExprId, what: &str) -> Result<ExprId> {
        slot.ok_or_else(|| {
            Error::invalid_shape(format!(
                "{} is missing its {what}",
                self.kind(owner).node_type()
            ))
        })
    }

    fn slot_operator(&self, slot: Option<ExprId>, owner: ExprId) -> Result<Operator> {
        let id = self.required(slot, owner, "operator")?;
        self.operator(id).ok_or_else(|| {
            Error::invalid_shape(format!(
                "expected an operator but found {}",
                self.kind(id).node_type()
            ))
        })
    }
}

fn pop_value(values: &mut Vec<Expression>) -> Result<Expression> {
    values
        .pop()
        .ok_or_else(|| Error::Internal("export value stack underflow".to_string()))
}
