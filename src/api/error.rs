use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::error::ClusterError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Cluster(err) => match err {
                ClusterError::Conflict { .. } => StatusCode::CONFLICT,
                ClusterError::NotFound(_) => StatusCode::NOT_FOUND,
                ClusterError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ClusterError::ProvisionFailure { .. }
                | ClusterError::DeprovisionFailure { .. }
                | ClusterError::InvalidTransition { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
