//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::NodeId;

/// Rule violations detected while validating a mutation.
///
/// A mutation that fails with one of these leaves the document untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("node name must not be empty")]
    EmptyName,

    #[error("a node named '{0}' already exists")]
    DuplicateName(String),

    #[error("attribute '{0}' is given more than once")]
    DuplicateAttribute(String),

    #[error("parent and child must not be the same node: {0}")]
    SameNode(NodeId),

    #[error("cannot link {parent} and {child}: both are on level {level}")]
    SameLevel {
        parent: NodeId,
        child: NodeId,
        level: usize,
    },

    #[error("an edge from {parent} to {child} already exists")]
    DuplicateEdge { parent: NodeId, child: NodeId },

    #[error("children of {parent} would sum to {total:.2}, which exceeds 1")]
    ProbabilityOverflow { parent: NodeId, total: f64 },

    #[error("probability must be a number between 0 and 1, got '{0}'")]
    InvalidProbability(String),

    #[error("the root node cannot be deleted: {0}")]
    CannotDeleteRoot(NodeId),

    #[error("cannot delete the only edge into {child} (from {parent})")]
    LastEdgeToChild { parent: NodeId, child: NodeId },
}

/// Domain errors represent business logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("edge not found: {parent} -> {child}")]
    EdgeNotFound { parent: NodeId, child: NodeId },

    #[error("cycle detected in tree at node: {0}")]
    CycleDetected(NodeId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
