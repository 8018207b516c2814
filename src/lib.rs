pub mod api;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod providers;
pub mod storage;
pub mod types;

pub use config::Config;
pub use engine::ClusterCoordinator;
pub use error::ClusterError;
pub use identity::derive_identifier;
pub use types::*;
