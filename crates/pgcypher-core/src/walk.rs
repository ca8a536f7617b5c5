//! Cursor-driven iterative depth-first walk.
//!
//! The same engine walks the Cypher source tree and the arena-backed
//! relational tree. Callers describe their tree with a cursor constructor
//! that lists a node's ordered children; the engine keeps the cursors on an
//! explicit stack instead of recursing, so visitors can hold state that is
//! correlated with depth and trees of any depth can be walked.
//!
//! For every node the visitor sees:
//!
//! - `enter` once, before the first child,
//! - `visit` once between each pair of consecutive children,
//! - `exit` once, after the last child.

use pgcypher_common::utils::error::Result;

/// A node plus the children not yet walked.
#[derive(Debug, Clone)]
pub struct WalkCursor<E> {
    node: E,
    branches: Vec<E>,
    branch_index: usize,
}

impl<E: Copy> WalkCursor<E> {
    /// Creates a cursor over a node and its ordered children.
    pub fn new(node: E, branches: Vec<E>) -> Self {
        Self {
            node,
            branches,
            branch_index: 0,
        }
    }

    /// Creates a cursor for a node without children.
    pub fn leaf(node: E) -> Self {
        Self::new(node, Vec::new())
    }

    /// The node this cursor points at.
    pub fn node(&self) -> E {
        self.node
    }

    /// The node's children.
    pub fn branches(&self) -> &[E] {
        &self.branches
    }

    /// Returns `true` until the first child has been taken.
    pub fn is_first_visit(&self) -> bool {
        self.branch_index == 0
    }

    /// Returns `true` while children remain.
    pub fn has_next(&self) -> bool {
        self.branch_index < self.branches.len()
    }

    /// Takes the next child.
    pub fn next_branch(&mut self) -> Option<E> {
        let next = self.branches.get(self.branch_index).copied()?;
        self.branch_index += 1;
        Some(next)
    }
}

/// Callbacks invoked by [`walk`].
///
/// Returning an error from any callback aborts the walk and the error is
/// returned from [`walk`] unchanged.
pub trait HierarchicalVisitor<E> {
    /// Called when a node is first reached.
    fn enter(&mut self, node: E) -> Result<()>;

    /// Called between two consecutive children of `node`.
    fn visit(&mut self, node: E) -> Result<()> {
        let _ = node;
        Ok(())
    }

    /// Called after the last child of `node`.
    fn exit(&mut self, node: E) -> Result<()>;

    /// Stops the walk early when it returns `true`.
    fn done(&self) -> bool {
        false
    }
}

/// Walks the tree rooted at `root` depth-first, left to right.
///
/// `cursor` lists the children of a node. It must fail for node types it
/// does not understand; that failure aborts the walk.
pub fn walk<E, V, F>(root: E, visitor: &mut V, mut cursor: F) -> Result<()>
where
    E: Copy,
    V: HierarchicalVisitor<E> + ?Sized,
    F: FnMut(E) -> Result<WalkCursor<E>>,
{
    let mut stack = vec![cursor(root)?];

    while let Some(top) = stack.last_mut() {
        if visitor.done() {
            break;
        }

        let node = top.node;
        let first_visit = top.is_first_visit();

        if first_visit {
            visitor.enter(node)?;
        }

        if let Some(branch) = top.next_branch() {
            if !first_visit {
                visitor.visit(node)?;
            }

            let child = cursor(branch)?;
            stack.push(child);
        } else {
            visitor.exit(node)?;
            stack.pop();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgcypher_common::utils::error::{Error, ErrorKind};

    // Children of node i in a tiny fixed tree:
    //        0
    //      / | \
    //     1  2  3
    //    / \
    //   4   5
    fn children(node: usize) -> Result<WalkCursor<usize>> {
        match node {
            0 => Ok(WalkCursor::new(0, vec![1, 2, 3])),
            1 => Ok(WalkCursor::new(1, vec![4, 5])),
            2..=5 => Ok(WalkCursor::leaf(node)),
            _ => Err(Error::unsupported("test_node", "cursor")),
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        stop_after_enters: Option<usize>,
        enters: usize,
    }

    impl HierarchicalVisitor<usize> for Recorder {
        fn enter(&mut self, node: usize) -> Result<()> {
            self.enters += 1;
            self.events.push(format!("enter {node}"));
            Ok(())
        }

        fn visit(&mut self, node: usize) -> Result<()> {
            self.events.push(format!("visit {node}"));
            Ok(())
        }

        fn exit(&mut self, node: usize) -> Result<()> {
            self.events.push(format!("exit {node}"));
            Ok(())
        }

        fn done(&self) -> bool {
            self.stop_after_enters.is_some_and(|limit| self.enters >= limit)
        }
    }

    #[test]
    fn test_walk_order() {
        let mut recorder = Recorder::default();
        walk(0, &mut recorder, children).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "enter 0", "enter 1", "enter 4", "exit 4", "visit 1", "enter 5", "exit 5",
                "exit 1", "visit 0", "enter 2", "exit 2", "visit 0", "enter 3", "exit 3",
                "exit 0",
            ]
        );
    }

    #[test]
    fn test_enter_exit_counts_match() {
        let mut recorder = Recorder::default();
        walk(0, &mut recorder, children).unwrap();

        let enters = recorder.events.iter().filter(|e| e.starts_with("enter")).count();
        let exits = recorder.events.iter().filter(|e| e.starts_with("exit")).count();
        let visits = recorder.events.iter().filter(|e| e.starts_with("visit")).count();
        assert_eq!(enters, 6);
        assert_eq!(exits, 6);
        assert_eq!(visits, 3);
    }

    #[test]
    fn test_walk_stops_when_done() {
        let mut recorder = Recorder {
            stop_after_enters: Some(2),
            ..Recorder::default()
        };
        walk(0, &mut recorder, children).unwrap();

        assert_eq!(recorder.enters, 2);
        assert!(!recorder.events.iter().any(|e| e == "exit 0"));
    }

    #[test]
    fn test_unknown_node_aborts() {
        let mut recorder = Recorder::default();
        let result = walk(0, &mut recorder, |node| {
            if node == 2 {
                children(99)
            } else {
                children(node)
            }
        });

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedConstruct);
        assert!(!recorder.events.iter().any(|e| e == "enter 3"));
    }

    #[test]
    fn test_cursor_accessors() {
        let mut cursor = WalkCursor::new('a', vec!['b', 'c']);
        assert!(cursor.is_first_visit());
        assert_eq!(cursor.next_branch(), Some('b'));
        assert!(!cursor.is_first_visit());
        assert!(cursor.has_next());
        assert_eq!(cursor.next_branch(), Some('c'));
        assert!(!cursor.has_next());
        assert_eq!(cursor.next_branch(), None);
        assert_eq!(cursor.branches(), &['b', 'c']);
    }
}
