use generational_arena::{Arena, Index};
use indexmap::IndexSet;
use std::fmt;
use tracing::instrument;

/// Handle to a node stored in a [`TreeArena`].
///
/// Stays valid until the node is released; a stale handle never aliases a
/// newer node because the arena is generational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "n{}g{}", slot, generation)
    }
}

/// Tree node in the arena: one element and the handles of its children.
///
/// There is no parent pointer. A node placed by fan-out sits in the child
/// list of every ancestor that took it.
#[derive(Debug, Clone)]
pub struct TreeNode<E> {
    pub element: E,
    /// Child handles in insertion order
    pub children: Vec<NodeId>,
}

impl<E> TreeNode<E> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-backed node storage with a single optional root.
///
/// Cloning the arena clones every node and its child list, keeping handles
/// valid in the copy, so a clone is a deep copy of the node graph.
#[derive(Debug, Clone)]
pub struct TreeArena<E> {
    arena: Arena<TreeNode<E>>,
    root: Option<NodeId>,
}

impl<E> Default for TreeArena<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TreeArena<E> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Stores a childless node that is not yet reachable from the root.
    #[instrument(level = "trace", skip_all)]
    pub fn insert_node(&mut self, element: E) -> NodeId {
        NodeId(self.arena.insert(TreeNode {
            element,
            children: Vec::new(),
        }))
    }

    /// Appends `child` to the child list of `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.arena.get_mut(parent.0) {
            node.children.push(child);
        }
    }

    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode<E>> {
        self.arena.get(id.0)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode<E>> {
        self.arena.get_mut(id.0)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// Drops the root and every stored node.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    /// Number of stored nodes, reachable or not.
    pub fn capacity_used(&self) -> usize {
        self.arena.len()
    }

    pub fn iter(&self) -> TreeIterator<'_, E> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_, E> {
        PostOrderIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        if let Some(node) = self.get_node(id) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Distinct nodes reachable from the root, in first-visit pre-order.
    pub fn reachable(&self) -> IndexSet<NodeId> {
        let mut seen = IndexSet::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.get_node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        seen
    }

    /// Releases every node no longer reachable from the root.
    ///
    /// Returns the number of released nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn prune_unreachable(&mut self) -> usize {
        let reachable = self.reachable();
        let before = self.arena.len();
        self.arena.retain(|idx, _| reachable.contains(&NodeId(idx)));
        before - self.arena.len()
    }
}

/// Pre-order walk. A node reachable through several parents is yielded once
/// per parent, the way a recursive descent over child lists would see it.
pub struct TreeIterator<'a, E> {
    arena: &'a TreeArena<E>,
    stack: Vec<NodeId>,
}

impl<'a, E> TreeIterator<'a, E> {
    fn new(arena: &'a TreeArena<E>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a, E> Iterator for TreeIterator<'a, E> {
    type Item = (NodeId, &'a TreeNode<E>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}

/// Post-order walk with the same repetition rule as [`TreeIterator`].
pub struct PostOrderIterator<'a, E> {
    arena: &'a TreeArena<E>,
    stack: Vec<(NodeId, bool)>,
}

impl<'a, E> PostOrderIterator<'a, E> {
    fn new(arena: &'a TreeArena<E>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a, E> Iterator for PostOrderIterator<'a, E> {
    type Item = (NodeId, &'a TreeNode<E>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                if !visited {
                    self.stack.push((current, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current, node));
                }
            }
        }
        None
    }
}
