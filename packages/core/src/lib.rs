//! Arbor Core - Cache-Backed Tree Store
//!
//! This crate provides the tree store for Arbor: a mutable tree of nodes
//! (identity plus parent reference) persisted in libsql and fronted by a
//! bounded, loader-backed cache.
//!
//! # Architecture
//!
//! - **Store is authoritative**: the durable store owns node state; the cache
//!   holds bounded, non-owning copies and is kept coherent with
//!   invalidate-then-insert after every write
//! - **Explicit bootstrap**: the singleton root is discovered or created
//!   exactly once when `TreeService` is constructed
//! - **Small error surface**: callers see `NodeNotFound` for absent
//!   identities; storage failures stay a distinct kind
//!
//! # Modules
//!
//! - [`models`] - Data structures (`Node`, `NodeId`)
//! - [`db`] - Database layer: `NodeStore` trait and libsql implementation
//! - [`services`] - `TreeService` orchestration and the node cache
//! - [`api`] - Thin axum HTTP transport over the service

pub mod api;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use services::*;
