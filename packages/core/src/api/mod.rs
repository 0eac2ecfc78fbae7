//! HTTP Tree API
//!
//! Thin axum transport over `TreeService`. This layer only translates:
//! request paths and bodies map to service operations, and service errors map
//! to HTTP status codes (`NodeNotFound` becomes 404 carrying the offending
//! identity). No tree logic lives here.
//!
//! # Endpoints
//!
//! - `GET  /tree` - fetch the root node
//! - `GET  /tree/:id` - fetch a specific node
//! - `POST /tree/:id` - create a node under parent `:id`
//! - `PUT  /tree/:id/move` - re-parent a node (body: `{"parentId": n}`)

mod error;
mod handlers;
mod server;

pub use error::{ApiError, ErrorBody};
pub use handlers::MoveNodeRequest;
pub use server::{init_tracing, router, serve};
