//! Tree API Handlers
//!
//! One handler per endpoint; each delegates to `TreeService` and lets
//! `ApiError` render failures.

use crate::api::error::ApiError;
use crate::models::{Node, NodeId};
use crate::services::TreeService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

/// Request body for a move: the new parent identity
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeRequest {
    pub parent_id: u64,
}

/// `GET /tree` - the root node
pub async fn get_tree(
    State(service): State<Arc<TreeService>>,
) -> Result<Json<Node>, ApiError> {
    let root = service.get_tree().await?;
    Ok(Json(root))
}

/// `GET /tree/:id` - a specific node
pub async fn get_node(
    State(service): State<Arc<TreeService>>,
    Path(id): Path<u64>,
) -> Result<Json<Node>, ApiError> {
    let node = service.get_node(NodeId::from(id)).await?;
    Ok(Json(node))
}

/// `POST /tree/:parent_id` - create a node under a parent
pub async fn create_node(
    State(service): State<Arc<TreeService>>,
    Path(parent_id): Path<u64>,
) -> Result<(StatusCode, Json<Node>), ApiError> {
    let node = service.create_node(NodeId::from(parent_id)).await?;
    Ok((StatusCode::CREATED, Json(node)))
}

/// `PUT /tree/:id/move` - re-parent a node
pub async fn move_node(
    State(service): State<Arc<TreeService>>,
    Path(id): Path<u64>,
    Json(body): Json<MoveNodeRequest>,
) -> Result<Json<Node>, ApiError> {
    let moved = service
        .move_node(NodeId::from(id), NodeId::from(body.parent_id))
        .await?;
    Ok(Json(moved))
}
