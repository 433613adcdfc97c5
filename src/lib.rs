//! Dependency tree with incremental leaf tracking.
//!
//! Requirements are pushed one at a time. The tree hangs each one beneath
//! everything that depends on it and always knows which inserted values have
//! nothing pending beneath them (the leaves). A satisfied leaf is popped once
//! it is no longer needed.
//!
//! ```
//! use deptree::domain::{DependencyTree, Ordered};
//!
//! let mut tree = DependencyTree::<Ordered<i32>>::new();
//! tree.push(5);
//! tree.push(3);
//! assert_eq!(tree.to_string(), "5\n  3");
//! assert_eq!(tree.leaves_values(), &[3]);
//!
//! tree.pop(&3).unwrap();
//! assert_eq!(tree.leaves_values(), &[5]);
//! assert!(tree.pop(&42).is_err());
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;

pub mod util {
    pub mod testing;
}

pub use domain::{DependencyTree, DomainError, Element, NodeId, Ordered};
