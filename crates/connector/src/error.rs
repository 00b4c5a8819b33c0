use {guildbeat_client::ApiError, guildbeat_protocol::ParamError};

use crate::host::HostError;

pub type Result<T> = std::result::Result<T, Error>;

/// Connector-level failures. Everything here is folded into a failed
/// `ActionResult` at the dispatch boundary; only session establishment
/// lets an `Error` reach the caller directly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error("invalid date `{0}`: expected `YYYY-MM-DD HH:MM:SS`")]
    InvalidDate(String),

    #[error("invalid poll checkpoint `{0}`")]
    InvalidCheckpoint(String),

    #[error("connector config: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Host(#[from] HostError),
}
