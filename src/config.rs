use serde::{Deserialize, Serialize};

use crate::providers::KindConfig;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub port: u16,
    pub kind_binary: String,
    pub timeout_secs: u64,
    pub node_image: Option<String>,
    pub wait: Option<String>,
    pub server_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparseable numbers fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: lookup("MCLUSTER_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            kind_binary: lookup("MCLUSTER_KIND_BIN").unwrap_or_else(|| "kind".to_string()),
            timeout_secs: lookup("MCLUSTER_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            node_image: lookup("MCLUSTER_NODE_IMAGE").filter(|s| !s.is_empty()),
            wait: lookup("MCLUSTER_WAIT").filter(|s| !s.is_empty()),
            server_url: lookup("MCLUSTER_SERVER")
                .unwrap_or_else(|| format!("http://localhost:{}", DEFAULT_PORT)),
        }
    }

    pub fn kind_config(&self) -> KindConfig {
        KindConfig {
            binary: self.kind_binary.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Arguments appended to `kind create cluster`.
    pub fn create_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(image) = &self.node_image {
            args.push("--image".to_string());
            args.push(image.clone());
        }
        if let Some(wait) = &self.wait {
            args.push("--wait".to_string());
            args.push(wait.clone());
        }
        args
    }
}
