//! Box-drawing rendering through `termtree`.
//!
//! The plain `Display` form of a tree indents children by two spaces. This
//! trait produces the same structure as a `termtree::Tree` for terminals.

use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::NodeId;
use crate::domain::element::Element;
use crate::domain::tree::DependencyTree;

pub trait ToTermTree {
    /// `None` for an empty tree.
    fn to_term_tree(&self) -> Option<Tree<String>>;
}

impl<E: Element> ToTermTree for DependencyTree<E> {
    #[instrument(level = "debug", skip(self))]
    fn to_term_tree(&self) -> Option<Tree<String>> {
        fn build<E: Element>(tree: &DependencyTree<E>, id: NodeId) -> Tree<String> {
            let label = tree
                .element(id)
                .map(ToString::to_string)
                .unwrap_or_default();
            let leaves: Vec<_> = tree
                .children(id)
                .iter()
                .map(|&child| build(tree, child))
                .collect();
            Tree::new(label).with_leaves(leaves)
        }

        self.root().map(|root| build(self, root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::element::Ordered;

    #[test]
    fn given_empty_tree_when_converting_then_none() {
        let tree = DependencyTree::<Ordered<u8>>::new();
        assert!(tree.to_term_tree().is_none());
    }

    #[test]
    fn given_nested_tree_when_converting_then_mirrors_structure() {
        let mut tree = DependencyTree::<Ordered<u8>>::new();
        tree.push(9);
        tree.push(5);
        tree.push(2);

        let term = tree.to_term_tree().unwrap();
        assert_eq!(term.root, "9");
        // 2 fans out under both 5 and 9.
        assert_eq!(term.leaves.len(), 2);
        assert_eq!(term.leaves[0].root, "5");
        assert_eq!(term.leaves[0].leaves[0].root, "2");
        assert_eq!(term.leaves[1].root, "2");

        let text = term.to_string();
        assert!(text.starts_with("9\n"));
        assert!(text.contains("5"));
        assert!(text.contains("2"));
    }
}
