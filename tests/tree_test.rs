//! Behaviour of the dependency tree: placement, fan-out, leaves, pop, copy.

use std::collections::HashSet;
use std::fmt;

use rstest::rstest;

use deptree::domain::{DependencyTree, DomainError, Element, Ordered, ToTermTree};
use deptree::util::testing::init_test_setup;

type IntTree = DependencyTree<Ordered<i32>>;

fn tree_of(values: &[i32]) -> IntTree {
    init_test_setup();
    let mut tree = IntTree::new();
    for &value in values {
        tree.push(value);
    }
    tree
}

/// Checks every structural invariant by walking the tree independently of
/// the cached leaf state.
fn assert_invariants<E: Element>(tree: &DependencyTree<E>) {
    let mut expected_leaves: Vec<E::Value> = Vec::new();
    for (id, node) in tree.iter_postorder() {
        if node.children.is_empty() {
            assert!(tree.is_leaf(id));
            if !expected_leaves.contains(node.element.value()) {
                expected_leaves.push(node.element.value().clone());
            }
        } else {
            assert!(!tree.is_leaf(id));
        }

        let mut seen = HashSet::new();
        for &child in &node.children {
            let child_element = tree.element(child).expect("child is stored");
            assert!(
                node.element.depends_on(child_element),
                "edge {} -> {} does not encode a dependency",
                node.element,
                child_element
            );
            assert!(
                seen.insert(child_element.value().clone()),
                "{} holds two children valued {}",
                node.element,
                child_element
            );
        }
    }
    assert_eq!(tree.leaves_values(), expected_leaves.as_slice());
}

// ============================================================
// Concrete scenarios
// ============================================================

#[test]
fn given_root_when_pushing_smaller_value_then_it_hangs_beneath() {
    let tree = tree_of(&[5, 3]);
    assert_eq!(tree.to_string(), "5\n  3");
    assert_eq!(tree.leaves_values(), &[3]);
}

#[test]
fn given_equal_child_when_pushing_again_then_rejected_and_unchanged() {
    let mut tree = tree_of(&[5, 3]);
    assert_eq!(tree.push(3), None);
    assert_eq!(tree.to_string(), "5\n  3");
    assert_eq!(tree.leaves_values(), &[3]);
    assert_eq!(tree.len(), 2);
}

#[test]
fn given_leaf_when_popping_then_parent_becomes_leaf() {
    let mut tree = tree_of(&[5, 3]);
    tree.pop(&3).unwrap();
    assert_eq!(tree.to_string(), "5");
    assert_eq!(tree.leaves_values(), &[5]);
}

#[test]
fn given_single_root_when_popping_it_then_tree_is_empty() {
    let mut tree = tree_of(&[5]);
    tree.pop(&5).unwrap();
    assert_eq!(tree.to_string(), "");
    assert!(tree.leaves_values().is_empty());
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.depth(), 0);
}

#[test]
fn given_empty_tree_then_renders_empty_and_has_no_leaves() {
    let tree = IntTree::new();
    assert_eq!(tree.to_string(), "");
    assert!(tree.leaves_values().is_empty());
    assert_eq!(tree.leaves_elements().count(), 0);
    assert!(tree.root_value().is_none());
}

// ============================================================
// Push return value
// ============================================================

#[test]
fn given_accepted_push_then_returned_handle_is_a_leaf_holding_the_value() {
    let mut tree = tree_of(&[9]);
    let id = tree.push(4).expect("4 hangs beneath 9");
    assert!(tree.is_leaf(id));
    assert_eq!(tree.element(id).map(Element::value), Some(&4));
    assert_eq!(tree.children(tree.root().unwrap()), &[id]);
}

#[test]
fn given_value_nothing_depends_on_when_pushing_then_none() {
    let mut tree = tree_of(&[5, 3]);
    assert_eq!(tree.push(8), None);
    assert_eq!(tree.to_string(), "5\n  3");
    assert!(!tree.contains(&8));
}

// ============================================================
// Fan-out
// ============================================================

#[test]
fn given_chain_when_pushing_smallest_then_attaches_under_every_ancestor() {
    let mut tree = tree_of(&[9, 5]);
    let id = tree.push(2).unwrap();

    assert_eq!(tree.to_string(), "9\n  5\n    2\n  2");
    let root = tree.root().unwrap();
    let five = tree.children(root)[0];
    assert_eq!(tree.children(root), &[five, id]);
    assert_eq!(tree.children(five), &[id]);
    // One node, two links
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.leaves_values(), &[2]);
    assert_eq!(tree.leaves_elements().count(), 1);
    assert_invariants(&tree);
}

#[test]
fn given_fanned_out_leaf_when_popping_then_every_link_goes() {
    let mut tree = tree_of(&[9, 5, 2]);
    tree.pop(&2).unwrap();
    assert_eq!(tree.to_string(), "9\n  5");
    assert_eq!(tree.leaves_values(), &[5]);
    assert_eq!(tree.len(), 2);
}

#[test]
fn given_existing_nodes_when_pushing_larger_value_then_no_reparenting() {
    // 7 > 2 but placement never adopts existing nodes.
    let tree = tree_of(&[9, 5, 2, 7, 6]);
    assert_eq!(
        tree.to_string(),
        "9\n  5\n    2\n  2\n  7\n    6\n  6"
    );
    assert_eq!(tree.leaves_values(), &[2, 6]);
    assert_eq!(tree.depth(), 3);
    assert_invariants(&tree);
}

// ============================================================
// Local deduplication quirk
// ============================================================

#[test]
fn given_late_parent_when_pushing_duplicate_then_equal_values_live_in_two_branches() {
    // 7 arrives after 3 so it never adopted it; a second 3 can hang under 7.
    let mut tree = tree_of(&[10, 3, 7]);
    let second = tree.push(3).expect("accepted under 7");

    assert_eq!(tree.to_string(), "10\n  3\n  7\n    3");
    assert_eq!(tree.len(), 4);
    assert!(tree.is_leaf(second));
    // Values deduplicate, elements do not.
    assert_eq!(tree.leaves_values(), &[3]);
    assert_eq!(tree.leaves_elements().count(), 2);
    assert_invariants(&tree);

    tree.pop(&3).unwrap();
    assert_eq!(tree.to_string(), "10\n  7");
    assert_eq!(tree.leaves_values(), &[7]);
}

// ============================================================
// Pop rejection
// ============================================================

#[rstest]
#[case(&[5, 3], 5)]
#[case(&[5, 3], 4)]
#[case(&[9, 5, 2], 5)]
#[case(&[], 1)]
fn given_non_leaf_value_when_popping_then_error_and_tree_untouched(
    #[case] values: &[i32],
    #[case] pop: i32,
) {
    let mut tree = tree_of(values);
    let before = tree.copy();

    let err = tree.pop(&pop).unwrap_err();
    assert_eq!(
        err,
        DomainError::NotALeaf {
            value: pop.to_string()
        }
    );
    assert_eq!(err.to_string(), format!("that element is not a leaf: {}", pop));
    assert_eq!(tree.to_string(), before.to_string());
    assert_eq!(tree.leaves_values(), before.leaves_values());
    assert_eq!(tree.len(), before.len());
}

// ============================================================
// Push then pop
// ============================================================

#[rstest]
#[case(&[10, 3, 7], 1)]
#[case(&[9, 5, 2], 1)]
#[case(&[5], 4)]
fn given_tree_when_pushing_then_popping_leaf_then_restored(
    #[case] values: &[i32],
    #[case] extra: i32,
) {
    let mut tree = tree_of(values);
    let rendered = tree.to_string();
    let leaves = tree.leaves_values().to_vec();

    tree.push(extra).expect("extra value is a new leaf");
    assert_ne!(tree.to_string(), rendered);
    tree.pop(&extra).unwrap();

    assert_eq!(tree.to_string(), rendered);
    assert_eq!(tree.leaves_values(), leaves.as_slice());
}

// ============================================================
// Copy
// ============================================================

#[test]
fn given_copy_when_mutating_it_then_original_unchanged() {
    let original = tree_of(&[9, 5, 2]);
    let mut copy = original.copy();
    assert_eq!(copy.to_string(), original.to_string());
    assert_eq!(copy.leaves_values(), original.leaves_values());

    copy.push(1);
    copy.pop(&1).unwrap();
    copy.pop(&2).unwrap();
    copy.pop(&5).unwrap();

    assert_eq!(copy.to_string(), "9");
    assert_eq!(original.to_string(), "9\n  5\n    2\n  2");
    assert_eq!(original.leaves_values(), &[2]);
}

#[test]
fn given_copy_when_mutating_original_then_copy_unchanged() {
    let mut original = tree_of(&[5, 3]);
    let copy = original.clone();
    original.pop(&3).unwrap();
    assert_eq!(copy.to_string(), "5\n  3");
    assert_eq!(copy.leaves_values(), &[3]);
}

// ============================================================
// Descending order and termtree rendering
// ============================================================

#[test]
fn given_descending_tree_when_pushing_then_greater_values_hang_beneath() {
    let mut tree = DependencyTree::<Ordered<i32>>::descending();
    tree.push(1);
    tree.push(4);
    tree.push(9);
    assert_eq!(tree.to_string(), "1\n  4\n    9\n  9");
    assert_eq!(tree.root_value(), Some(&1));
}

#[test]
fn given_tree_when_converting_to_termtree_then_labels_match() {
    let tree = tree_of(&[5, 3]);
    let term = tree.to_term_tree().expect("non-empty");
    assert_eq!(term.root, "5");
    assert_eq!(term.leaves.len(), 1);
    assert_eq!(term.leaves[0].root, "3");
}

// ============================================================
// Caller-defined elements
// ============================================================

/// Path-like requirement: `a/b` depends on `a`.
#[derive(Debug, Clone)]
struct Requirement(String);

impl Requirement {
    fn new(path: String) -> Self {
        Self(path)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl Element for Requirement {
    type Value = String;

    fn value(&self) -> &String {
        &self.0
    }

    fn depends_on(&self, other: &Self) -> bool {
        self.0.len() > other.0.len() && self.0.starts_with(&format!("{}/", other.0))
    }
}

#[test]
fn given_custom_element_when_pushing_then_its_ordering_drives_placement() {
    let mut tree = DependencyTree::<Requirement>::with_factory(Requirement::new);
    tree.push("a/b/c".to_string());
    tree.push("a/b".to_string());
    tree.push("a".to_string());
    assert_eq!(tree.push("x".to_string()), None);

    assert_eq!(tree.to_string(), "<a/b/c>\n  <a/b>\n    <a>\n  <a>");
    assert_eq!(tree.leaves_values(), &["a".to_string()]);
    let leaves: Vec<String> = tree.leaves_elements().map(ToString::to_string).collect();
    assert_eq!(leaves, vec!["<a>"]);
    assert_invariants(&tree);
}

// ============================================================
// Invariants over generated sequences
// ============================================================

/// Deterministic pseudo-random values in `0..range`.
fn sequence(seed: u64, len: usize, range: u64) -> Vec<i32> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) % range) as i32
        })
        .collect()
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(42)]
#[case(1234)]
#[case(99991)]
fn given_generated_pushes_and_pops_then_invariants_hold(#[case] seed: u64) {
    let mut tree = IntTree::new();
    tree.push(100);
    for (step, value) in sequence(seed, 40, 60).into_iter().enumerate() {
        tree.push(value);
        assert_invariants(&tree);

        if step % 3 == 2 {
            let leaf = tree.leaves_values()[0];
            tree.pop(&leaf).unwrap();
            assert!(!tree.contains(&leaf));
            assert_invariants(&tree);
        }
    }
}
