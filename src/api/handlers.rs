use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

use crate::api::error::ApiError;
use crate::engine::ClusterCoordinator;
use crate::error::ClusterError;
use crate::types::{ClusterMetadata, ClusterRecord};

/// Body of `PUT /cluster/{name}`. Every field is optional; an empty body is
/// accepted.
#[derive(Debug, Default, Deserialize)]
pub struct CreateClusterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub metadata: ClusterMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateClusterResponse {
    pub name: String,
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClusterResponse {
    pub name: String,
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    pub state: String,
    #[serde(flatten)]
    pub metadata: ClusterMetadata,
    pub created_at: DateTime<Utc>,
}

impl From<ClusterRecord> for ClusterResponse {
    fn from(record: ClusterRecord) -> Self {
        Self {
            name: record.name,
            cluster_id: record.identifier,
            state: record.state.as_str().to_string(),
            metadata: record.metadata,
            created_at: record.created_at,
        }
    }
}

/// kind cluster names end up in container names and kubeconfig contexts, so
/// they are held to DNS label rules.
pub fn validate_cluster_name(name: &str) -> Result<(), ClusterError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?$").expect("cluster name pattern is valid")
    });

    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(ClusterError::InvalidInput(format!(
            "cluster name '{}' must be 1-63 lowercase alphanumerics or '-', \
             starting and ending with an alphanumeric",
            name
        )))
    }
}

fn parse_create_request(body: &[u8]) -> Result<CreateClusterRequest, ClusterError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(CreateClusterRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ClusterError::InvalidInput(format!("request body: {}", e)))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn list_clusters(
    State(coordinator): State<Arc<ClusterCoordinator>>,
) -> Json<Vec<ClusterResponse>> {
    let clusters = coordinator.list_clusters().await;
    Json(clusters.into_iter().map(ClusterResponse::from).collect())
}

pub async fn get_cluster(
    State(coordinator): State<Arc<ClusterCoordinator>>,
    Path(name): Path<String>,
) -> Result<Json<ClusterResponse>, ApiError> {
    validate_cluster_name(&name)?;
    let record = coordinator.get_cluster(&name).await?;
    Ok(Json(ClusterResponse::from(record)))
}

pub async fn create_cluster(
    State(coordinator): State<Arc<ClusterCoordinator>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<CreateClusterResponse>, ApiError> {
    validate_cluster_name(&name)?;
    let request = parse_create_request(&body)?;

    if let Some(body_name) = request.name.as_deref() {
        if body_name != name {
            log::debug!("Ignoring body name '{}' for cluster '{}'", body_name, name);
        }
    }

    let cluster_id = coordinator.create_cluster(&name, request.metadata).await?;
    Ok(Json(CreateClusterResponse { name, cluster_id }))
}

pub async fn delete_cluster(
    State(coordinator): State<Arc<ClusterCoordinator>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_cluster_name(&name)?;
    coordinator.delete_cluster(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}
