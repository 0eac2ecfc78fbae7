//! Data Models
//!
//! Core data structures for the Arbor tree:
//!
//! - `NodeId` - store-assigned node identity
//! - `Node` - a tree element (identity plus optional parent reference)

pub mod node;

pub use node::{Node, NodeId};
