pub mod kind;
pub mod testing;

pub use kind::{KindConfig, KindProvider};
pub use testing::ScriptedProvider;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &str {
        match self {
            Verb::Create => "create",
            Verb::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a successful tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and reported failure. `diagnostics` is what it printed.
    #[error("`{command}` exited with {}: {diagnostics}", describe_exit(.exit_code))]
    Exited {
        command: String,
        exit_code: Option<i32>,
        diagnostics: String,
    },

    #[error("`{command}` timed out after {timeout_secs}s")]
    TimedOut { command: String, timeout_secs: u64 },

    /// The invocation did not run to completion (panic or runtime shutdown).
    #[error("{verb} invocation aborted: {reason}")]
    Aborted { verb: Verb, reason: String },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// The external cluster tool, as seen by the coordinator.
#[async_trait]
pub trait ClusterProvider: Send + Sync {
    async fn invoke(&self, verb: Verb, name: &str, args: &[String]) -> Result<ToolOutput, ProviderError>;
}
