//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::NodeId;

/// Domain errors represent violations of the record-set invariants.
/// These are independent of how the records were loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected in cost hierarchy at record: {0}")]
    CycleDetected(String),

    #[error("cost record {record} references unknown budget: {budget}")]
    UnknownBudget { record: String, budget: String },

    #[error("duplicate cost record id: {0}")]
    DuplicateRecord(String),

    #[error("cost record {record} references unknown parent {parent} in budget {budget}")]
    OrphanRecord {
        record: String,
        parent: String,
        budget: String,
    },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
