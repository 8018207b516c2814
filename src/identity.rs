//! Cluster identifiers.
//!
//! The identifier is the lowercase hex SHA-256 of the cluster name, so any
//! party holding the name can recompute it without asking the server.

use sha2::{Digest, Sha256};

pub fn derive_identifier(name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}
