//! NodeStore Trait - Database Abstraction Layer
//!
//! This module defines the `NodeStore` trait that abstracts durable node
//! persistence. The trait is the seam between `TreeService` (business logic)
//! and the database implementation, and is what the node cache loads through
//! on a miss.
//!
//! # Design Decisions
//!
//! 1. **Async-first**: all methods are async; store reads and writes are the
//!    only I/O suspension points in the system
//! 2. **Absence is not an error**: `get_node` returns `Ok(None)` for a
//!    missing row. Only the service layer decides that absence means
//!    `NodeNotFound`; storage failures stay a separate error kind and are
//!    never folded into "not found"
//! 3. **Store-assigned identity**: `create_node` takes only the parent
//!    reference and returns the canonical persisted node, identity included
//! 4. **Root discovery by absence-of-parent**: `get_root_node` is keyed on
//!    `parent_id IS NULL` rather than scanning all rows

use crate::db::error::StoreError;
use crate::models::{Node, NodeId};
use async_trait::async_trait;

/// Abstraction layer for durable node persistence
///
/// Implementations must be `Send + Sync` so the store can be shared across
/// async tasks, and must tolerate concurrent access: the cache may issue
/// duplicate loads for the same key, which are idempotent reads.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Persist a new node and assign its identity
    ///
    /// `parent_id` is `None` only when bootstrapping the root. Parent
    /// existence is validated by the service layer before this is called;
    /// the foreign-key constraint is the last line of defense.
    ///
    /// Returns the canonical persisted node, including the assigned identity.
    async fn create_node(&self, parent_id: Option<NodeId>) -> Result<Node, StoreError>;

    /// Fetch a node by identity
    ///
    /// - `Ok(Some(node))` if the node exists
    /// - `Ok(None)` if it doesn't (not an error)
    /// - `Err(_)` if the database operation itself fails
    async fn get_node(&self, id: NodeId) -> Result<Option<Node>, StoreError>;

    /// Re-persist a node whose parent reference changed
    ///
    /// The identity must already exist in the store. Returns the canonical
    /// persisted value after the write.
    async fn update_node(&self, node: &Node) -> Result<Node, StoreError>;

    /// Discover the root node, if one has been persisted
    ///
    /// The root is the unique row with no parent reference. Used exactly once
    /// per process, during `TreeService` bootstrap.
    async fn get_root_node(&self) -> Result<Option<Node>, StoreError>;
}
