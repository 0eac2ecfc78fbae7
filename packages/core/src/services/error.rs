//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations.
//!
//! The caller-facing taxonomy is deliberately small: every absence case
//! (lookup miss, unknown create parent, unknown move node or target parent)
//! surfaces as `NodeNotFound` carrying the offending identity. Storage
//! failures unrelated to absence keep their own variant and are never
//! converted to "not found".

use crate::db::StoreError;
use crate::models::NodeId;
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum TreeServiceError {
    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// Database operation failed (storage unavailable, SQL failure)
    #[error("Database operation failed: {0}")]
    Store(#[from] StoreError),

    /// The bootstrapped root could not be resolved.
    ///
    /// Post-bootstrap the root is guaranteed present, so this indicates an
    /// internal consistency bug rather than a caller error.
    #[error("Tree invariant violated: root node {id} is unresolvable")]
    RootInvariantViolated { id: NodeId },

    /// Service configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl TreeServiceError {
    /// Create a node not found error
    pub fn node_not_found(id: NodeId) -> Self {
        Self::NodeNotFound { id }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Whether this error is a caller-facing "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. })
    }
}
