use serde::{Deserialize, Serialize};

/// CEF field block of an artifact. Keys are serialized the way the host
/// expects them; absent values serialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cef {
    #[serde(rename = "URL", default)]
    pub url: String,
    #[serde(rename = "Type", default)]
    pub content_type: String,
    #[serde(rename = "Description", default)]
    pub description: String,
}

/// A discrete piece of evidence attached to a host container. Created
/// transiently; ownership transfers to the host on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub container_id: String,
    pub name: String,
    pub cef: Cef,
}

/// Host sensitivity label for a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    #[default]
    White,
    Green,
}

/// An investigative case record created for each newly observed message
/// during polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub description: String,
    pub sensitivity: Sensitivity,
}
