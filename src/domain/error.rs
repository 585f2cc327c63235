//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree and scene invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NotFound(String),

    #[error("duplicate node identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("cycle detected in hierarchy: {0}")]
    CycleDetected(String),

    #[error("scene node is its own parent: {0}")]
    SelfParent(String),
}
