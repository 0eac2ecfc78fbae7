//! TursoStore - NodeStore Implementation for libsql
//!
//! Thin `NodeStore` implementation over `DatabaseService`. All SQL for node
//! persistence lives here; row-to-model conversion happens in one place.
//!
//! # Design Principles
//!
//! 1. **Pure persistence**: no business rules; parent validation and cache
//!    coordination belong to the service layer
//! 2. **Canonical values**: writes use `RETURNING` so callers always get the
//!    row as the database sees it, identity included
//! 3. **Row conversion**: `row_to_node` is the single conversion point for
//!    all query operations

use crate::db::node_store::NodeStore;
use crate::db::{DatabaseService, StoreError};
use crate::models::{Node, NodeId};
use async_trait::async_trait;
use libsql::{params, Row};
use std::sync::Arc;

/// libsql-backed implementation of the `NodeStore` trait
pub struct TursoStore {
    /// Underlying database service
    db: Arc<DatabaseService>,
}

impl TursoStore {
    /// Create a new TursoStore over an initialized database
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Convert a libsql Row to the Node model
    ///
    /// Expected columns (in order): id (INTEGER), parent_id (INTEGER, nullable)
    fn row_to_node(row: &Row) -> Result<Node, StoreError> {
        let id: i64 = row
            .get(0)
            .map_err(|e| StoreError::sql_execution(format!("Failed to get id: {}", e)))?;
        let parent_id: Option<i64> = row
            .get(1)
            .map_err(|e| StoreError::sql_execution(format!("Failed to get parent_id: {}", e)))?;

        Ok(Node::new(
            NodeId::from_row_id(id),
            parent_id.map(NodeId::from_row_id),
        ))
    }

    /// Run a single-row query and convert the result, if any
    async fn query_one(
        conn: &libsql::Connection,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Option<Node>, StoreError> {
        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| StoreError::sql_execution(format!("Query failed: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| StoreError::sql_execution(format!("Row fetch failed: {}", e)))?
        {
            Some(row) => Ok(Some(Self::row_to_node(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl NodeStore for TursoStore {
    async fn create_node(&self, parent_id: Option<NodeId>) -> Result<Node, StoreError> {
        let conn = self.db.connect_with_timeout().await?;

        let created = Self::query_one(
            &conn,
            "INSERT INTO nodes (parent_id) VALUES (?) RETURNING id, parent_id",
            params![parent_id.map(|p| p.as_row_id())],
        )
        .await?;

        created.ok_or_else(|| {
            StoreError::sql_execution("INSERT .. RETURNING produced no row".to_string())
        })
    }

    async fn get_node(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        let conn = self.db.connect_with_timeout().await?;

        Self::query_one(
            &conn,
            "SELECT id, parent_id FROM nodes WHERE id = ?",
            params![id.as_row_id()],
        )
        .await
    }

    async fn update_node(&self, node: &Node) -> Result<Node, StoreError> {
        let conn = self.db.connect_with_timeout().await?;

        let updated = Self::query_one(
            &conn,
            "UPDATE nodes SET parent_id = ? WHERE id = ? RETURNING id, parent_id",
            params![
                node.parent_id.map(|p| p.as_row_id()),
                node.id.as_row_id()
            ],
        )
        .await?;

        updated.ok_or_else(|| {
            StoreError::sql_execution(format!(
                "UPDATE of node {} matched no row; identity vanished from store",
                node.id
            ))
        })
    }

    async fn get_root_node(&self) -> Result<Option<Node>, StoreError> {
        let conn = self.db.connect_with_timeout().await?;

        Self::query_one(
            &conn,
            "SELECT id, parent_id FROM nodes WHERE parent_id IS NULL LIMIT 1",
            (),
        )
        .await
    }
}
