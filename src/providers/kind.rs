use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{ClusterProvider, ProviderError, ToolOutput, Verb};

#[derive(Debug, Clone)]
pub struct KindConfig {
    pub binary: String,
    pub timeout_secs: u64,
}

impl Default for KindConfig {
    fn default() -> Self {
        Self {
            binary: "kind".to_string(),
            timeout_secs: 600,
        }
    }
}

/// Runs the `kind` CLI as a subprocess.
#[derive(Debug, Clone)]
pub struct KindProvider {
    config: KindConfig,
}

impl KindProvider {
    pub fn new(config: KindConfig) -> Self {
        Self { config }
    }

    pub fn command_args(verb: Verb, name: &str, args: &[String]) -> Vec<String> {
        let mut command = vec![
            verb.as_str().to_string(),
            "cluster".to_string(),
            "--name".to_string(),
            name.to_string(),
        ];
        command.extend(args.iter().cloned());
        command
    }

    fn display_command(&self, args: &[String]) -> String {
        format!("{} {}", self.config.binary, args.join(" "))
    }
}

#[async_trait]
impl ClusterProvider for KindProvider {
    async fn invoke(&self, verb: Verb, name: &str, args: &[String]) -> Result<ToolOutput, ProviderError> {
        let args = Self::command_args(verb, name, args);
        let command = self.display_command(&args);

        log::info!("Running `{}`", command);

        let child = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProviderError::Spawn {
                command: command.clone(),
                source,
            })?;

        // Dropping the child on timeout kills it.
        let output = match tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(output) => output.map_err(|source| ProviderError::Spawn {
                command: command.clone(),
                source,
            })?,
            Err(_) => {
                return Err(ProviderError::TimedOut {
                    command,
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        for line in stderr.lines().chain(stdout.lines()) {
            log::debug!("[{} {}] {}", verb, name, line);
        }

        if !output.status.success() {
            // kind reports progress and errors on stderr
            let diagnostics = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };

            return Err(ProviderError::Exited {
                command,
                exit_code: output.status.code(),
                diagnostics,
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_with(binary: &str, timeout_secs: u64) -> KindProvider {
        KindProvider::new(KindConfig {
            binary: binary.to_string(),
            timeout_secs,
        })
    }

    /// Write an executable stand-in for `kind` that never finishes.
    #[cfg(unix)]
    fn hanging_binary(dir: &tempfile::TempDir) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("kind");
        std::fs::write(&path, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_command_args() {
        let args = KindProvider::command_args(
            Verb::Create,
            "dev",
            &["--image".to_string(), "kindest/node:v1.31.0".to_string()],
        );
        assert_eq!(
            args,
            vec!["create", "cluster", "--name", "dev", "--image", "kindest/node:v1.31.0"]
        );

        let args = KindProvider::command_args(Verb::Delete, "dev", &[]);
        assert_eq!(args, vec!["delete", "cluster", "--name", "dev"]);
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let provider = provider_with("/nonexistent/mcluster-kind", 5);
        let err = provider.invoke(Verb::Create, "dev", &[]).await.unwrap_err();
        assert!(matches!(err, ProviderError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_captures_output() {
        // `echo` prints its arguments and exits 0
        let provider = provider_with("echo", 5);
        let output = provider.invoke(Verb::Create, "dev", &[]).await.unwrap();
        assert_eq!(output.stdout.trim(), "create cluster --name dev");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_surfaces_diagnostics() {
        // `ls` on a missing path exits non-zero with a message on stderr
        let provider = provider_with("ls", 5);
        let err = provider.invoke(Verb::Delete, "dev", &[]).await.unwrap_err();

        match err {
            ProviderError::Exited {
                exit_code,
                diagnostics,
                ..
            } => {
                assert_ne!(exit_code, Some(0));
                assert!(!diagnostics.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_tool_times_out() {
        let dir = tempfile::TempDir::new().unwrap();
        let provider = provider_with(&hanging_binary(&dir), 1);

        let started = std::time::Instant::now();
        let err = provider.invoke(Verb::Create, "dev", &[]).await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(10));
        match err {
            ProviderError::TimedOut { command, timeout_secs } => {
                assert_eq!(timeout_secs, 1);
                assert!(command.ends_with("create cluster --name dev"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_create_rolls_back() {
        use crate::engine::ClusterCoordinator;
        use crate::types::ClusterMetadata;
        use std::sync::Arc;

        let dir = tempfile::TempDir::new().unwrap();
        let provider = Arc::new(provider_with(&hanging_binary(&dir), 1));
        let coordinator = ClusterCoordinator::new(provider as Arc<dyn ClusterProvider>);

        let err = coordinator
            .create_cluster("dev", ClusterMetadata::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("timed out after 1s"), "{}", err);
        assert!(coordinator.get_cluster("dev").await.unwrap_err().is_not_found());
    }
}
