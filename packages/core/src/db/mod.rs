//! Database Layer
//!
//! This module handles all durable persistence for nodes using libsql:
//!
//! - Database initialization and connection management (`DatabaseService`)
//! - The `NodeStore` trait - the abstraction boundary the service layer
//!   depends on
//! - `TursoStore` - the libsql-backed `NodeStore` implementation
//!
//! # Architecture
//!
//! The durable store is the sole owner of authoritative node state. The
//! in-memory cache in the service layer holds non-owning copies; any cache
//! miss is safely resolvable by a store read through this layer.

mod database;
mod error;
mod node_store;
mod turso_store;

pub use database::DatabaseService;
pub use error::StoreError;
pub use node_store::NodeStore;
pub use turso_store::TursoStore;
