//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent rejected tree operations.
/// A failed operation leaves the tree exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("that element is not a leaf: {value}")]
    NotALeaf { value: String },
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
