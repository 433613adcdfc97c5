//! Domain layer: elements, the dependency tree and its renderings
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod element;
pub mod error;
pub mod render;
pub mod tree;

pub use arena::{NodeId, TreeArena, TreeNode};
pub use element::{ordered_factory, Direction, Element, ElementFactory, Ordered};
pub use error::{DomainError, DomainResult};
pub use render::ToTermTree;
pub use tree::DependencyTree;
