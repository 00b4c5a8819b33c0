use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The single structured outcome of one dispatched action. The host owns
/// persistence; the connector only builds and returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub summary: Map<String, Value>,
}

impl ActionResult {
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
            data: Vec::new(),
            summary: Map::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Vec::new(),
            summary: Map::new(),
        }
    }

    pub fn add_data(&mut self, row: Value) -> &mut Self {
        self.data.push(row);
        self
    }

    pub fn set_summary(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.summary.insert(key.into(), value.into());
        self
    }

    /// Builder-style variant of [`set_summary`](Self::set_summary).
    pub fn with_summary(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_summary(key, value);
        self
    }
}
