//! Dependency tree with leaf tracking.
//!
//! Values are pushed one at a time. Each new node is hung beneath every
//! existing node whose element depends on it, as deep as possible, unless
//! that parent already holds a child with an equal value. After every
//! mutation the set of childless nodes ("leaves") is recomputed from scratch.
//!
//! # Fan-out
//!
//! One push may link the same node under several ancestors. The storage is
//! therefore a graph of arena handles, while every traversal walks child
//! lists tree-style and meets a shared node once per parent. This is the
//! intended shape: removal by value detaches all of those links at once.
//!
//! Deduplication only looks at the direct children of each candidate
//! parent, so equal values can still live in unrelated branches.

use std::fmt;

use indexmap::IndexSet;
use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{NodeId, PostOrderIterator, TreeArena, TreeIterator};
use crate::domain::element::{Element, ElementFactory, Ordered};
use crate::domain::error::{DomainError, DomainResult};

pub struct DependencyTree<E: Element> {
    nodes: TreeArena<E>,
    factory: ElementFactory<E>,
    leaf_nodes: IndexSet<NodeId>,
    leaf_values: Vec<E::Value>,
}

impl<E> DependencyTree<E>
where
    E: Element + From<<E as Element>::Value>,
{
    /// Empty tree that wraps values through `E::from`.
    pub fn new() -> Self {
        Self::with_factory(<E as From<E::Value>>::from)
    }
}

impl<E> Default for DependencyTree<E>
where
    E: Element + From<<E as Element>::Value>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DependencyTree<Ordered<T>>
where
    Ordered<T>: Element<Value = T>,
{
    /// Empty tree where smaller values depend on greater ones.
    pub fn descending() -> Self {
        Self::with_factory(Ordered::descending)
    }
}

impl<E: Element> DependencyTree<E> {
    /// Empty tree using `factory` to turn pushed values into elements.
    pub fn with_factory(factory: ElementFactory<E>) -> Self {
        Self {
            nodes: TreeArena::new(),
            factory,
            leaf_nodes: IndexSet::new(),
            leaf_values: Vec::new(),
        }
    }

    /// Wraps `value` and places it in the tree.
    ///
    /// Returns the new node's handle when it is a leaf after placement, and
    /// `None` when every candidate parent already held an equal value so the
    /// node was dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn push(&mut self, value: E::Value) -> Option<NodeId> {
        let element = (self.factory)(value);
        let new_node = self.nodes.insert_node(element);

        match self.nodes.root() {
            None => self.nodes.set_root(new_node),
            Some(root) => self.place(root, new_node),
        }

        // Drops the new node when nothing took it.
        self.nodes.prune_unreachable();
        self.update();

        if self.leaf_nodes.contains(&new_node) {
            Some(new_node)
        } else {
            debug!("pushed value rejected as redundant");
            None
        }
    }

    /// Removes every node holding `value`, which must currently be a leaf value.
    ///
    /// Fails with [`DomainError::NotALeaf`] and leaves the tree untouched otherwise.
    #[instrument(level = "debug", skip(self))]
    pub fn pop(&mut self, value: &E::Value) -> DomainResult<()> {
        if !self.leaf_values.contains(value) {
            return Err(DomainError::NotALeaf {
                value: (self.factory)(value.clone()).to_string(),
            });
        }

        for id in self.nodes.reachable() {
            let matching: Vec<NodeId> = match self.nodes.get_node(id) {
                Some(node) => node
                    .children
                    .iter()
                    .copied()
                    .filter(|&child| self.holds(child, value))
                    .collect(),
                None => continue,
            };
            if matching.is_empty() {
                continue;
            }
            if let Some(node) = self.nodes.get_node_mut(id) {
                node.children.retain(|child| !matching.contains(child));
            }
        }

        let root_matches = self
            .nodes
            .root()
            .is_some_and(|root| self.holds(root, value));
        if root_matches {
            debug!("popped the root, tree is now empty");
            self.nodes.clear();
        } else {
            let released = self.nodes.prune_unreachable();
            trace!(released, "released detached nodes");
        }

        self.update();
        Ok(())
    }

    /// Elements of the current leaf nodes, in post-order of first visit.
    pub fn leaves_elements(&self) -> impl Iterator<Item = &E> + '_ {
        self.leaf_nodes
            .iter()
            .filter_map(|&id| self.nodes.get_node(id).map(|node| &node.element))
    }

    /// Values of the current leaf nodes, first-seen order, without duplicates.
    pub fn leaves_values(&self) -> &[E::Value] {
        &self.leaf_values
    }

    /// True iff `id` names a node that currently has no children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.leaf_nodes.contains(&id)
    }

    /// Independent deep copy; mutating it never affects `self`.
    pub fn copy(&self) -> Self
    where
        E: Clone,
    {
        self.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.root().is_none()
    }

    /// Number of distinct nodes; a fanned-out node counts once.
    pub fn len(&self) -> usize {
        self.nodes.reachable().len()
    }

    pub fn depth(&self) -> usize {
        self.nodes.depth()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.nodes.root()
    }

    pub fn root_value(&self) -> Option<&E::Value> {
        self.nodes
            .root()
            .and_then(|root| self.element(root))
            .map(Element::value)
    }

    pub fn element(&self, id: NodeId) -> Option<&E> {
        self.nodes.get_node(id).map(|node| &node.element)
    }

    /// Child handles of `id`, in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get_node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, value: &E::Value) -> bool {
        self.nodes
            .reachable()
            .into_iter()
            .any(|id| self.holds(id, value))
    }

    pub fn iter(&self) -> TreeIterator<'_, E> {
        self.nodes.iter()
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_, E> {
        self.nodes.iter_postorder()
    }

    /// Tries `new_node` beneath the subtree at `at`: children first, so the
    /// node lands as deep as it can, then `at` itself.
    fn place(&mut self, at: NodeId, new_node: NodeId) {
        if at == new_node {
            return;
        }

        // Child lists below `at` may grow during recursion, never `at`'s own.
        let children = self.children(at).to_vec();
        for child in children {
            self.place(child, new_node);
        }

        if self.depends(at, new_node) && !self.already_added(at, new_node) {
            trace!(parent = %at, child = %new_node, "attaching");
            self.nodes.attach(at, new_node);
        }
    }

    /// A node is redundant under `parent` if it is already one of its
    /// children, or a child there already carries an equal value.
    fn already_added(&self, parent: NodeId, new_node: NodeId) -> bool {
        let Some(parent_node) = self.nodes.get_node(parent) else {
            return true;
        };
        if parent_node.children.contains(&new_node) {
            return true;
        }
        let Some(new_element) = self.element(new_node) else {
            return true;
        };
        let siblings = parent_node
            .children
            .iter()
            .filter_map(|&child| self.element(child));
        !new_element.is_distinct_from(siblings)
    }

    fn depends(&self, parent: NodeId, child: NodeId) -> bool {
        match (self.element(parent), self.element(child)) {
            (Some(parent), Some(child)) => parent.depends_on(child),
            _ => false,
        }
    }

    fn holds(&self, id: NodeId, value: &E::Value) -> bool {
        self.element(id).is_some_and(|element| element.value() == value)
    }

    /// Recomputes the leaf caches with a full post-order walk.
    #[instrument(level = "trace", skip(self))]
    fn update(&mut self) {
        let leaves: Vec<(NodeId, E::Value)> = self
            .nodes
            .iter_postorder()
            .filter(|(_, node)| node.is_leaf())
            .map(|(id, node)| (id, node.element.value().clone()))
            .collect();

        self.leaf_nodes = leaves.iter().map(|(id, _)| *id).collect();
        self.leaf_values = leaves.into_iter().map(|(_, value)| value).unique().collect();
        trace!(leaves = ?self.leaf_values, "leaves recomputed");
    }
}

impl<E: Element + Clone> Clone for DependencyTree<E> {
    fn clone(&self) -> Self {
        let mut tree = Self {
            nodes: self.nodes.clone(),
            factory: self.factory,
            leaf_nodes: IndexSet::new(),
            leaf_values: Vec::new(),
        };
        tree.update();
        tree
    }
}

impl<E: Element> fmt::Debug for DependencyTree<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyTree")
            .field("root", &self.nodes.root())
            .field("nodes", &self.len())
            .field("leaves", &self.leaf_values)
            .finish()
    }
}

impl<E: Element> fmt::Display for DependencyTree<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.nodes.root() {
            Some(root) => f.write_str(&self.render(root)),
            None => Ok(()),
        }
    }
}

impl<E: Element> DependencyTree<E> {
    fn render(&self, id: NodeId) -> String {
        let Some(node) = self.nodes.get_node(id) else {
            return String::new();
        };
        let mut lines = vec![node.element.to_string()];
        for &child in &node.children {
            lines.push(indent(&self.render(child), "  "));
        }
        lines.join("\n")
    }
}

/// Prefixes every line holding non-whitespace text.
fn indent(text: &str, prefix: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect()
}
