//! File-backed host implementation for standalone runs.
//!
//! Artifacts and containers are logged rather than shipped anywhere; the
//! connector state lives in a single JSON file next to the process.

use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

use {async_trait::async_trait, serde_json::Value, tracing::info};

use {
    guildbeat_connector::{ConnectorConfig, HostError, HostResult, SoarHost},
    guildbeat_protocol::{Artifact, Container},
};

pub struct FileHost {
    config: ConnectorConfig,
    state_path: PathBuf,
    container_id: String,
    artifact_seq: AtomicU64,
    container_seq: AtomicU64,
}

impl FileHost {
    pub fn new(config: ConnectorConfig, state_path: PathBuf, container_id: String) -> Self {
        Self {
            config,
            state_path,
            container_id,
            artifact_seq: AtomicU64::new(0),
            container_seq: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl SoarHost for FileHost {
    fn config(&self) -> HostResult<ConnectorConfig> {
        Ok(self.config.clone())
    }

    fn container_id(&self) -> String {
        self.container_id.clone()
    }

    async fn save_artifact(&self, artifact: &Artifact) -> HostResult<String> {
        let id = format!("artifact-{}", self.artifact_seq.fetch_add(1, Ordering::SeqCst) + 1);
        let rendered = serde_json::to_string(artifact)
            .map_err(|e| HostError::new(format!("artifact not serializable: {e}")))?;
        info!(artifact_id = %id, artifact = %rendered, "artifact saved");
        Ok(id)
    }

    async fn save_container(&self, container: &Container) -> HostResult<String> {
        let id = format!(
            "container-{}",
            self.container_seq.fetch_add(1, Ordering::SeqCst) + 1
        );
        let rendered = serde_json::to_string(container)
            .map_err(|e| HostError::new(format!("container not serializable: {e}")))?;
        info!(container_id = %id, container = %rendered, "container saved");
        Ok(id)
    }

    /// Missing file reads as an empty record. An unparseable file is
    /// returned as a raw string so the connector's strict state parse
    /// takes the reset path instead of initialization failing outright.
    async fn load_state(&self) -> HostResult<Value> {
        let raw = match std::fs::read_to_string(&self.state_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Value::Object(serde_json::Map::new()));
            }
            Err(e) => return Err(HostError::new(format!("reading state file: {e}"))),
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(raw)),
        }
    }

    async fn save_state(&self, state: &Value) -> HostResult<()> {
        let rendered = serde_json::to_string_pretty(state)
            .map_err(|e| HostError::new(format!("state not serializable: {e}")))?;
        std::fs::write(&self.state_path, rendered)
            .map_err(|e| HostError::new(format!("writing state file: {e}")))
    }
}
