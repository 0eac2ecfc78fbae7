//! Business Services
//!
//! This module contains the core business logic services:
//!
//! - `TreeService` - root bootstrap, node lookup, creation, and moves
//! - `NodeCache` - bounded, loader-backed cache in front of the durable store
//!
//! Services coordinate between the database layer and application logic,
//! enforcing the tree-shape invariants (unique root, valid parent references)
//! across concurrent operations.

pub mod error;
pub mod node_cache;
pub mod tree_service;

pub use error::TreeServiceError;
pub use node_cache::NodeCache;
pub use tree_service::{TreeService, TreeServiceConfig, DEFAULT_CACHE_CAPACITY};
