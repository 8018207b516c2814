//! HTTP client for the control plane, used by the `create`, `delete`, `get`
//! and `list` subcommands.

use anyhow::{anyhow, Context, Result};
use reqwest::{Response, StatusCode};

use crate::api::handlers::{ClusterResponse, CreateClusterResponse};
use crate::types::ClusterMetadata;

#[derive(Debug, Clone)]
pub struct ClusterClient {
    base_url: String,
    client: reqwest::Client,
}

impl ClusterClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn cluster_url(&self, name: &str) -> String {
        format!("{}/cluster/{}", self.base_url, name)
    }

    /// Returns the cluster ID.
    pub async fn create(&self, name: &str, metadata: &ClusterMetadata) -> Result<String> {
        let mut body = serde_json::to_value(metadata)?;
        body["name"] = serde_json::Value::String(name.to_string());

        let response = self
            .client
            .put(self.cluster_url(name))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("PUT {}", self.cluster_url(name)))?;

        let created: CreateClusterResponse = check(response).await?.json().await?;
        Ok(created.cluster_id)
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.cluster_url(name))
            .send()
            .await
            .with_context(|| format!("DELETE {}", self.cluster_url(name)))?;

        check(response).await?;
        Ok(())
    }

    pub async fn get(&self, name: &str) -> Result<ClusterResponse> {
        let response = self
            .client
            .get(self.cluster_url(name))
            .send()
            .await
            .with_context(|| format!("GET {}", self.cluster_url(name)))?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn list(&self) -> Result<Vec<ClusterResponse>> {
        let url = format!("{}/clusters", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        Ok(check(response).await?.json().await?)
    }
}

/// Pass 2xx responses through; turn anything else into an error carrying the
/// server's message.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);

    Err(anyhow!("{}: {}", describe(status), message))
}

fn describe(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
