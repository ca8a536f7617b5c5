//! Stack-driven incremental construction over an [`ExpressionTree`].

use pgcypher_common::utils::error::{Error, Result};

use super::{ExprId, ExpressionTree, NodeKind};
use crate::model::Operator;

/// Builds expressions bottom-up with an explicit stack of open nodes.
///
/// The stack mirrors the walk over whatever tree is being translated:
/// callers push nodes that are still being filled, assign finished children
/// into the top of the stack, and pop once a node is complete.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: ExpressionTree,
    stack: Vec<ExprId>,
}

impl TreeBuilder {
    /// Creates a builder over an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// The arena being built.
    pub fn tree(&self) -> &ExpressionTree {
        &self.tree
    }

    /// Current stack depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Adds a detached node to the arena without touching the stack.
    pub fn add(&mut self, kind: NodeKind) -> ExprId {
        self.tree.add(kind)
    }

    /// Adds an operator node without touching the stack.
    pub fn add_operator(&mut self, operator: Operator) -> ExprId {
        self.tree.add_operator(operator)
    }

    /// Pushes a node.
    pub fn push(&mut self, id: ExprId) {
        self.stack.push(id);
    }

    /// Pops the top node.
    pub fn pop(&mut self) -> Result<ExprId> {
        self.stack
            .pop()
            .ok_or_else(|| Error::Internal("expression builder stack underflow".to_string()))
    }

    /// Returns the top node.
    pub fn peek(&self) -> Result<ExprId> {
        self.stack
            .last()
            .copied()
            .ok_or_else(|| Error::Internal("expression builder stack is empty".to_string()))
    }

    /// Assigns `id` into the next free slot of the top node.
    pub fn assign(&mut self, id: ExprId) -> Result<()> {
        let target = self.peek()?;
        self.tree.assign(target, id)
    }

    /// Assigns `id` into the top node, if any, then pushes it.
    pub fn push_assign(&mut self, id: ExprId) -> Result<()> {
        if !self.stack.is_empty() {
            self.assign(id)?;
        }
        self.push(id);
        Ok(())
    }

    /// Pops the top node and assigns it into the node below.
    pub fn pop_assign(&mut self) -> Result<()> {
        let id = self.pop()?;
        self.assign(id)
    }

    /// Truncates the stack to `depth` entries.
    pub fn ascend(&mut self, depth: usize) -> Result<()> {
        if depth > self.stack.len() {
            return Err(Error::Internal(format!(
                "cannot ascend to depth {depth} from depth {}",
                self.stack.len()
            )));
        }
        self.stack.truncate(depth);
        Ok(())
    }

    /// Continues the right-leaning `operator` chain on top of the stack with
    /// `operand`. When the chain has to grow a nested node, that node is
    /// pushed so the next call continues from it.
    pub fn continue_binary_expression(&mut self, operator: Operator, operand: ExprId) -> Result<()> {
        let target = self.peek()?;
        let tail = self
            .tree
            .continue_binary_expression(target, operator, operand)?;
        if tail != target {
            self.push(tail);
        }
        Ok(())
    }

    /// Finishes building. Exactly one node, the root, must be left on the
    /// stack.
    pub fn finish(mut self) -> Result<(ExpressionTree, ExprId)> {
        let root = self.pop()?;
        if !self.stack.is_empty() {
            return Err(Error::Internal(format!(
                "expression builder finished with {} dangling nodes",
                self.stack.len()
            )));
        }
        Ok((self.tree, root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Expression;
    use pgcypher_common::utils::error::{ErrorKind, Slot};

    #[test]
    fn test_push_assign_links_children() {
        let mut builder = TreeBuilder::new();
        let root = builder.add(NodeKind::unary());
        builder.push_assign(root).unwrap();
        let not = builder.add_operator(Operator::Not);
        builder.assign(not).unwrap();
        let a = builder.add(NodeKind::Identifier("a".into()));
        builder.push_assign(a).unwrap();
        builder.pop().unwrap();

        let (tree, root) = builder.finish().unwrap();
        assert_eq!(
            tree.export(root).unwrap(),
            Expression::unary(Operator::Not, Expression::identifier("a"))
        );
    }

    #[test]
    fn test_pop_assign() {
        let mut builder = TreeBuilder::new();
        let root = builder.add(NodeKind::binary());
        builder.push(root);
        for name in ["a", "b"] {
            let id = builder.add(NodeKind::Identifier(name.into()));
            builder.push(id);
            builder.pop_assign().unwrap();
        }
        let extra = builder.add(NodeKind::Identifier("c".into()));
        builder.push(extra);
        assert_eq!(
            builder.pop_assign().unwrap_err(),
            Error::SlotAlreadyAssigned(Slot::Operand)
        );
    }

    #[test]
    fn test_continue_descends_and_ascend_restores() {
        let mut builder = TreeBuilder::new();
        let root = builder.add(NodeKind::binary());
        builder.push(root);
        let depth = builder.depth();

        for name in ["a", "b", "c"] {
            let id = builder.add(NodeKind::Identifier(name.into()));
            builder.continue_binary_expression(Operator::Or, id).unwrap();
        }
        assert_eq!(builder.depth(), depth + 1);

        builder.ascend(depth).unwrap();
        assert_eq!(builder.peek().unwrap(), root);
        assert!(builder.ascend(depth + 5).is_err());
    }

    #[test]
    fn test_finish_requires_single_root() {
        let builder = TreeBuilder::new();
        assert_eq!(builder.finish().unwrap_err().kind(), ErrorKind::Internal);

        let mut builder = TreeBuilder::new();
        let a = builder.add(NodeKind::Identifier("a".into()));
        let b = builder.add(NodeKind::Identifier("b".into()));
        builder.push(a);
        builder.push(b);
        assert_eq!(builder.finish().unwrap_err().kind(), ErrorKind::Internal);
    }
}
