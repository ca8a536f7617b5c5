//! Conjunction fragmentation.
//!
//! Splits a predicate into independent conjunctions, one per set of bindings
//! referenced, so each can be attached to the CTE that completes that set.
//!
//! Only the conjunctive spine is split: the root, if it is an `and`, and
//! every `and` whose parent is on the spine. Anything else (`or`, `not`,
//! comparisons, parentheticals) is kept whole. For each spine node the walk
//! tracks the identifiers referenced by its left and its right operand.
//! When a spine node exits:
//!
//! - if neither operand was split and both reference the same bindings, the
//!   node stays whole and its parent decides,
//! - otherwise the node is marked rewritten and each operand that is not
//!   itself rewritten is offshot: detached from the node and conjoined onto
//!   the fragment for its dependency key.
//!
//! A root that is never rewritten becomes a single fragment. Offshoots are
//! applied in the order their subtrees start in the source, so each
//! fragment reads in source order.

use std::collections::BTreeSet;

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use pgcypher_common::utils::error::Result;
use pgcypher_core::model::{Expression, Operator};
use pgcypher_core::tree::{ExprId, ExpressionTree, NodeKind};
use pgcypher_core::walk::{HierarchicalVisitor, walk};

/// A conjunction over one set of bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Sorted dependencies joined with `,`. Empty for constant predicates.
    pub key: String,
    /// Bindings referenced, sorted.
    pub dependencies: Vec<String>,
    /// The conjunction.
    pub expression: Expression,
}

/// Fragments keyed by dependency key, in source order of their first
/// predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FragmentMap {
    fragments: IndexMap<String, Fragment>,
}

impl FragmentMap {
    /// Returns the fragment for a dependency key.
    pub fn get(&self, key: &str) -> Option<&Fragment> {
        self.fragments.get(key)
    }

    /// Iterates over the fragments in order.
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.values()
    }

    /// Iterates over the dependency keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns `true` if there are no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Consumes the map, returning the fragments in order.
    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments.into_values().collect()
    }
}

/// Canonical key of a dependency set: sorted identifiers joined with `,`.
pub fn dependency_key<'a>(dependencies: impl IntoIterator<Item = &'a str>) -> String {
    let sorted: BTreeSet<&str> = dependencies.into_iter().collect();
    sorted.into_iter().collect::<Vec<_>>().join(",")
}

/// Fragments a relational expression.
///
/// # Errors
///
/// Fails with [`Error::InvalidExpressionShape`](pgcypher_common::Error::InvalidExpressionShape)
/// if the expression has unfilled slots.
pub fn fragment(expression: &Expression) -> Result<FragmentMap> {
    let mut tree = ExpressionTree::new();
    let root = tree.import(expression)?;
    fragment_tree(&mut tree, root)
}

/// Fragments the expression rooted at `root`, detaching the offshoots from
/// their parents in place.
pub fn fragment_tree(tree: &mut ExpressionTree, root: ExprId) -> Result<FragmentMap> {
    let offshoots = {
        let mut extractor = Extractor::new(tree, root);
        walk(root, &mut extractor, |id| tree.cursor(id))?;
        extractor.finish()
    };

    let mut builder = FragmentBuilder::default();
    for offshoot in offshoots {
        tracing::trace!(
            node = offshoot.id.index(),
            dependencies = ?offshoot.dependencies,
            "offshoot"
        );
        tree.detach(offshoot.id)?;
        builder.add(tree, offshoot)?;
    }
    builder.finish(tree)
}

/// A subtree leaving its parent for the fragment of its dependencies.
#[derive(Debug)]
struct Offshoot {
    id: ExprId,
    dependencies: BTreeSet<String>,
    ordinal: usize,
}

/// Dependencies of the two operands of a spine `and`.
#[derive(Debug)]
struct SpineFrame {
    id: ExprId,
    left: BTreeSet<String>,
    right: BTreeSet<String>,
    on_right: bool,
}

impl SpineFrame {
    fn current(&mut self) -> &mut BTreeSet<String> {
        if self.on_right {
            &mut self.right
        } else {
            &mut self.left
        }
    }
}

struct Extractor<'t> {
    tree: &'t ExpressionTree,
    root: ExprId,
    spine: Vec<SpineFrame>,
    /// Every dependency of the whole expression.
    all: BTreeSet<String>,
    rewritten: HashSet<ExprId>,
    ordinals: HashMap<ExprId, usize>,
    offshoots: Vec<Offshoot>,
}

impl<'t> Extractor<'t> {
    fn new(tree: &'t ExpressionTree, root: ExprId) -> Self {
        Self {
            tree,
            root,
            spine: Vec::new(),
            all: BTreeSet::new(),
            rewritten: HashSet::new(),
            ordinals: HashMap::new(),
            offshoots: Vec::new(),
        }
    }

    fn is_spine(&self, id: ExprId) -> bool {
        self.tree.operator_of(id) == Some(Operator::And)
            && self.tree.parent(id) == self.spine.last().map(|frame| frame.id)
    }

    fn dependency(&self, id: ExprId) -> Option<String> {
        match self.tree.kind(id) {
            NodeKind::Identifier(name) => Some(name.clone()),
            NodeKind::CompoundIdentifier(name) => name.root().map(str::to_string),
            _ => None,
        }
    }

    fn offshoot(&mut self, id: ExprId, dependencies: BTreeSet<String>) {
        let ordinal = self.ordinals.get(&id).copied().unwrap_or_default();
        self.offshoots.push(Offshoot {
            id,
            dependencies,
            ordinal,
        });
    }

    fn finish(mut self) -> Vec<Offshoot> {
        if !self.rewritten.contains(&self.root) {
            let all = std::mem::take(&mut self.all);
            self.offshoot(self.root, all);
        }
        let mut offshoots = self.offshoots;
        offshoots.sort_by_key(|offshoot| offshoot.ordinal);
        offshoots
    }
}

impl HierarchicalVisitor<ExprId> for Extractor<'_> {
    fn enter(&mut self, id: ExprId) -> Result<()> {
        let ordinal = self.ordinals.len();
        self.ordinals.insert(id, ordinal);

        if let Some(dependency) = self.dependency(id) {
            for frame in &mut self.spine {
                frame.current().insert(dependency.clone());
            }
            self.all.insert(dependency);
        } else if self.is_spine(id) {
            self.spine.push(SpineFrame {
                id,
                left: BTreeSet::new(),
                right: BTreeSet::new(),
                on_right: false,
            });
        }
        Ok(())
    }

    fn visit(&mut self, id: ExprId) -> Result<()> {
        // The operator slot carries no dependencies, so switching at the
        // first revisit is the same as switching before the right operand.
        if let Some(frame) = self.spine.last_mut() {
            if frame.id == id {
                frame.on_right = true;
            }
        }
        Ok(())
    }

    fn exit(&mut self, id: ExprId) -> Result<()> {
        if self.spine.last().map(|frame| frame.id) != Some(id) {
            return Ok(());
        }
        let Some(frame) = self.spine.pop() else {
            return Ok(());
        };

        let NodeKind::Binary { left, right, .. } = self.tree.kind(id) else {
            return Ok(());
        };
        let (left, right) = (*left, *right);

        let left_rewritten = left.is_some_and(|left| self.rewritten.contains(&left));
        let right_rewritten = right.is_some_and(|right| self.rewritten.contains(&right));

        if !left_rewritten && !right_rewritten && frame.left == frame.right {
            return Ok(());
        }

        self.rewritten.insert(id);
        if let (Some(left), false) = (left, left_rewritten) {
            self.offshoot(left, frame.left);
        }
        if let (Some(right), false) = (right, right_rewritten) {
            self.offshoot(right, frame.right);
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Entry {
    dependencies: Vec<String>,
    root: ExprId,
    /// Rightmost `and` node of the fragment, once it has more than one operand.
    tail: Option<ExprId>,
}

#[derive(Debug, Default)]
struct FragmentBuilder {
    entries: IndexMap<String, Entry>,
}

impl FragmentBuilder {
    fn add(&mut self, tree: &mut ExpressionTree, offshoot: Offshoot) -> Result<()> {
        let key = dependency_key(offshoot.dependencies.iter().map(String::as_str));

        match self.entries.get_mut(&key) {
            Some(entry) => {
                tracing::debug!(key = %key, "conjoining fragment");
                match entry.tail {
                    None => {
                        let root = tree.conjoin(entry.root, offshoot.id)?;
                        entry.root = root;
                        entry.tail = Some(root);
                    }
                    Some(tail) => {
                        entry.tail =
                            Some(tree.continue_binary_expression(tail, Operator::And, offshoot.id)?);
                    }
                }
            }
            None => {
                tracing::debug!(key = %key, "registering fragment");
                self.entries.insert(
                    key,
                    Entry {
                        dependencies: offshoot.dependencies.into_iter().collect(),
                        root: offshoot.id,
                        tail: None,
                    },
                );
            }
        }
        Ok(())
    }

    fn finish(self, tree: &ExpressionTree) -> Result<FragmentMap> {
        let mut fragments = IndexMap::with_capacity(self.entries.len());
        for (key, entry) in self.entries {
            let expression = tree.export(entry.root)?;
            fragments.insert(
                key.clone(),
                Fragment {
                    key,
                    dependencies: entry.dependencies,
                    expression,
                },
            );
        }
        Ok(FragmentMap { fragments })
    }
}
