//! A scripted [`ClusterProvider`] for unit and integration tests.
//!
//! Outcomes are configured per verb, every call is recorded, and calls can
//! be held open until the test releases them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use super::{ClusterProvider, ProviderError, ToolOutput, Verb};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    Fail(String),
    TimeOut,
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub verb: Verb,
    pub name: String,
    pub args: Vec<String>,
}

#[derive(Default)]
pub struct ScriptedProvider {
    outcomes: Mutex<HashMap<Verb, Outcome>>,
    invocations: Mutex<Vec<Invocation>>,
    delay: Option<Duration>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedProvider {
    /// Succeeds on every verb.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(self, verb: Verb, outcome: Outcome) -> Self {
        self.set_outcome(verb, outcome);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold every call until [`ScriptedProvider::release`] hands out a permit.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn set_outcome(&self, verb: Verb, outcome: Outcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(verb, outcome);
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn invocation_count(&self, verb: Verb) -> usize {
        self.invocations().iter().filter(|i| i.verb == verb).count()
    }

    fn outcome(&self, verb: Verb) -> Outcome {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&verb)
            .cloned()
            .unwrap_or(Outcome::Succeed)
    }
}

#[async_trait]
impl ClusterProvider for ScriptedProvider {
    async fn invoke(&self, verb: Verb, name: &str, args: &[String]) -> Result<ToolOutput, ProviderError> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Invocation {
                verb,
                name: name.to_string(),
                args: args.to_vec(),
            });

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let command = format!("kind {} cluster --name {}", verb, name);
        match self.outcome(verb) {
            Outcome::Succeed => Ok(ToolOutput {
                stdout: String::new(),
                stderr: format!("{} cluster \"{}\" ✓", verb, name),
            }),
            Outcome::Fail(diagnostics) => Err(ProviderError::Exited {
                command,
                exit_code: Some(1),
                diagnostics,
            }),
            Outcome::TimeOut => Err(ProviderError::TimedOut {
                command,
                timeout_secs: 0,
            }),
            Outcome::Panic => panic!("scripted provider panic during {}", verb),
        }
    }
}
