//! API Error Mapping
//!
//! Translates `TreeServiceError` into HTTP responses. The mapping is the
//! transport's responsibility, not the core's:
//!
//! - `NodeNotFound` → 404 with a JSON body naming the missing identity
//! - everything else (storage failure, violated root invariant) → 500 with a
//!   generic body; details stay in the server logs

use crate::services::TreeServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// JSON error body returned by the tree API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Error wrapper carrying the HTTP rendering of a service failure
#[derive(Debug)]
pub struct ApiError(pub TreeServiceError);

impl From<TreeServiceError> for ApiError {
    fn from(err: TreeServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            TreeServiceError::NodeNotFound { id } => (
                StatusCode::NOT_FOUND,
                format!("Node with id \"{}\" not found", id),
            ),
            other => {
                error!("tree API internal error: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
