/// Static context messages for each remote operation, surfaced verbatim in
/// failed action results.
pub mod context {
    pub const FETCHING_GUILD: &str = "Cannot fetch guild from Discord.";
    pub const FETCHING_CHANNEL: &str = "Cannot fetch channel from Discord.";
    pub const FETCHING_MESSAGE: &str = "Cannot fetch message from Discord.";
    pub const SENDING_MESSAGE: &str = "Cannot send message to Discord.";
    pub const DELETING_MESSAGE: &str = "Cannot delete message from Discord.";
    pub const FETCHING_MEMBER: &str = "Cannot fetch member from Discord.";
    pub const KICKING_MEMBER: &str = "Cannot kick member from Discord.";
    pub const BANNING_MEMBER: &str = "Cannot ban member from Discord.";
    pub const FETCHING_HISTORY: &str = "Cannot fetch message history from Discord.";
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Classified remote-call failure. `Discord` covers errors raised by the
/// platform SDK itself; anything else lands in `Unexpected`. Both abort the
/// calling handler the same way — the split only changes the message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{context} Error type: {kind}. Details: {details}")]
    Discord {
        context: &'static str,
        kind: String,
        details: String,
    },

    #[error("Other exception. Error type: {kind}. Details: {details}")]
    Unexpected { kind: String, details: String },
}

impl ApiError {
    pub fn discord(
        context: &'static str,
        kind: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::Discord {
            context,
            kind: kind.into(),
            details: details.into(),
        }
    }

    pub fn unexpected(kind: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Unexpected {
            kind: kind.into(),
            details: details.into(),
        }
    }
}
