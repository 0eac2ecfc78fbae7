//! Node Data Structures
//!
//! This module defines the `Node` struct and the `NodeId` identity type for
//! Arbor's tree store.
//!
//! # Architecture
//!
//! - **Store-assigned identity**: `NodeId` values are allocated by the durable
//!   store on insert and never change afterwards
//! - **Explicit root typing**: the root is the node whose `parent_id` is
//!   `None`; "is this the root" is a type-level fact, not a sentinel value
//! - **Minimal mutation surface**: only the parent reference of a node can
//!   change (via a move), so `Node` exposes `reparented()` rather than a
//!   setter
//!
//! # Examples
//!
//! ```rust
//! use arbor_core::models::{Node, NodeId};
//!
//! let root = Node::new(NodeId::from(1), None);
//! assert!(root.is_root());
//!
//! let child = Node::new(NodeId::from(2), Some(root.id));
//! assert_eq!(child.parent_id, Some(NodeId::from(1)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identity of a node, assigned by the durable store on creation.
///
/// Wraps the store's integer row identity. Serialized as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Raw identity value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Identity as the signed integer form used by the SQL layer
    pub fn as_row_id(&self) -> i64 {
        self.0 as i64
    }

    /// Build an identity from a SQL row id
    pub fn from_row_id(row_id: i64) -> Self {
        Self(row_id as u64)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tree element: identity plus an optional parent reference.
///
/// # Fields
///
/// - `id`: Unique identifier, assigned by the store and immutable thereafter
/// - `parent_id`: Reference to the parent node; `None` only for the root
///
/// Parent references are validated against the durable store at create/move
/// time by `TreeService`; a `Node` in hand may still be a stale cached copy
/// until re-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier (store-assigned)
    pub id: NodeId,

    /// Parent node ID; `None` means this node is the root
    pub parent_id: Option<NodeId>,
}

impl Node {
    /// Create a node value with the given identity and parent reference
    pub fn new(id: NodeId, parent_id: Option<NodeId>) -> Self {
        Self { id, parent_id }
    }

    /// Whether this node is the tree root
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Copy of this node with its parent reference replaced.
    ///
    /// The identity is preserved; this is the only mutation a node supports.
    pub fn reparented(&self, new_parent_id: NodeId) -> Self {
        Self {
            id: self.id,
            parent_id: Some(new_parent_id),
        }
    }
}
