use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use crate::error::Error;

/// Externally supplied asset configuration: the bot token and the guild
/// the session is bound to. Read-only after load.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Discord bot token.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Target guild identifier (integer-as-string).
    pub guild_id: String,
}

impl ConnectorConfig {
    /// Parsed guild id; empty or non-numeric values are config errors.
    pub fn guild_id_u64(&self) -> Result<u64, Error> {
        self.guild_id
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::Config(format!("invalid guild_id `{}`", self.guild_id)))
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.token.expose_secret().is_empty() {
            return Err(Error::Config("bot token is required".into()));
        }
        self.guild_id_u64().map(|_| ())
    }
}

impl std::fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("token", &"[REDACTED]")
            .field("guild_id", &self.guild_id)
            .finish()
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            guild_id: String::new(),
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
