use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed set of action identifiers the connector recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TestConnectivity,
    FetchMessage,
    DeleteMessage,
    ListChannels,
    SendMessage,
    KickUser,
    BanUser,
    FetchMessageHistory,
    GetUser,
    OnPoll,
}

impl Action {
    /// Look up an action by its wire identifier. Unknown identifiers are
    /// the caller's problem to surface as an explicit error.
    pub fn parse(id: &str) -> Option<Self> {
        Some(match id {
            "test_connectivity" => Self::TestConnectivity,
            "fetch_message" => Self::FetchMessage,
            "delete_message" => Self::DeleteMessage,
            "list_channels" => Self::ListChannels,
            "send_message" => Self::SendMessage,
            "kick_user" => Self::KickUser,
            "ban_user" => Self::BanUser,
            "fetch_message_history" => Self::FetchMessageHistory,
            "get_user" => Self::GetUser,
            "on_poll" => Self::OnPoll,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TestConnectivity => "test_connectivity",
            Self::FetchMessage => "fetch_message",
            Self::DeleteMessage => "delete_message",
            Self::ListChannels => "list_channels",
            Self::SendMessage => "send_message",
            Self::KickUser => "kick_user",
            Self::BanUser => "ban_user",
            Self::FetchMessageHistory => "fetch_message_history",
            Self::GetUser => "get_user",
            Self::OnPoll => "on_poll",
        }
    }
}

/// Parameter extraction failure — always an input error, detected before
/// any remote call is made.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("missing required parameter `{0}`")]
    Missing(String),

    #[error("invalid parameter `{name}`: {reason}")]
    Invalid { name: String, reason: String },
}

impl ParamError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// A host-issued action request: an identifier plus a bag of named
/// parameters. Immutable for the duration of a dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub parameters: Value,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>, parameters: Value) -> Self {
        Self {
            action: action.into(),
            parameters,
        }
    }

    /// Trimmed, non-empty string parameter; `None` when absent, null,
    /// empty, or not a string.
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ParamError> {
        self.str_param(key)
            .ok_or_else(|| ParamError::Missing(key.to_string()))
    }

    /// Snowflake-style identifier supplied as an integer-as-string.
    pub fn require_id(&self, key: &str) -> Result<u64, ParamError> {
        let raw = self.require_str(key)?;
        raw.parse::<u64>()
            .map_err(|_| ParamError::invalid(key, format!("`{raw}` is not a numeric id")))
    }

    pub fn bool_param(&self, key: &str, default: bool) -> bool {
        self.parameters
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    pub fn u64_param(&self, key: &str, default: u64) -> u64 {
        self.parameters
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or(default)
    }

    /// Signed integer parameter, kept signed so callers can reject
    /// negative values explicitly.
    pub fn i64_param(&self, key: &str) -> Option<i64> {
        self.parameters.get(key).and_then(Value::as_i64)
    }
}
