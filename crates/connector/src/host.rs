//! Capability interface onto the SOAR host platform.
//!
//! The original connector inherits these capabilities from a host base
//! class; here they are an injected collaborator so the core can be
//! exercised against an in-memory host.

use std::sync::Mutex;

use {async_trait::async_trait, serde_json::Value};

use {
    crate::config::ConnectorConfig,
    guildbeat_protocol::{Artifact, Container},
};

pub type HostResult<T> = Result<T, HostError>;

/// Failure reported by the host platform itself (persistence, state
/// store). Distinct from remote-call failures.
#[derive(Debug, thiserror::Error)]
#[error("host: {0}")]
pub struct HostError(String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// What the connector needs from its host: asset config, the active
/// container, artifact/container persistence, and the state store.
#[async_trait]
pub trait SoarHost: Send + Sync {
    fn config(&self) -> HostResult<ConnectorConfig>;

    /// Identifier of the container the current action runs under;
    /// artifacts created outside polling attach to it.
    fn container_id(&self) -> String;

    /// Persist an artifact; returns the host-assigned artifact id.
    async fn save_artifact(&self, artifact: &Artifact) -> HostResult<String>;

    /// Persist a container; returns the host-assigned container id.
    async fn save_container(&self, container: &Container) -> HostResult<String>;

    /// Raw persisted state. A missing store should surface as an empty
    /// record, not an error; an unreadable store is an error and aborts
    /// initialization.
    async fn load_state(&self) -> HostResult<Value>;

    async fn save_state(&self, state: &Value) -> HostResult<()>;
}

/// In-memory host used by tests and available for embedding.
pub struct MemoryHost {
    config: ConnectorConfig,
    container_id: String,
    artifacts: Mutex<Vec<Artifact>>,
    containers: Mutex<Vec<Container>>,
    state: Mutex<Value>,
}

impl MemoryHost {
    pub fn new(config: ConnectorConfig) -> Self {
        Self {
            config,
            container_id: "container-0".into(),
            artifacts: Mutex::new(Vec::new()),
            containers: Mutex::new(Vec::new()),
            state: Mutex::new(Value::Object(serde_json::Map::new())),
        }
    }

    pub fn with_state(self, state: Value) -> Self {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
        self
    }

    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn containers(&self) -> Vec<Container> {
        self.containers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn state(&self) -> Value {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(ConnectorConfig::default())
    }
}

#[async_trait]
impl SoarHost for MemoryHost {
    fn config(&self) -> HostResult<ConnectorConfig> {
        Ok(self.config.clone())
    }

    fn container_id(&self) -> String {
        self.container_id.clone()
    }

    async fn save_artifact(&self, artifact: &Artifact) -> HostResult<String> {
        let mut artifacts = self.artifacts.lock().unwrap_or_else(|e| e.into_inner());
        artifacts.push(artifact.clone());
        Ok(format!("artifact-{}", artifacts.len()))
    }

    async fn save_container(&self, container: &Container) -> HostResult<String> {
        let mut containers = self.containers.lock().unwrap_or_else(|e| e.into_inner());
        containers.push(container.clone());
        Ok(format!("container-{}", containers.len()))
    }

    async fn load_state(&self) -> HostResult<Value> {
        Ok(self.state())
    }

    async fn save_state(&self, state: &Value) -> HostResult<()> {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state.clone();
        Ok(())
    }
}
