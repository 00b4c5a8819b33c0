use {
    chrono::{DateTime, NaiveDateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// Checkpoint timestamp wire format: UTC, second precision.
pub const POLL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid date `{0}`: expected `YYYY-MM-DD HH:MM:SS`")]
    InvalidDate(String),
}

/// Strict parse of a checkpoint / history-bound date string.
pub fn parse_poll_date(raw: &str) -> Result<DateTime<Utc>, StateError> {
    NaiveDateTime::parse_from_str(raw, POLL_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| StateError::InvalidDate(raw.to_string()))
}

pub fn format_poll_date(ts: DateTime<Utc>) -> String {
    ts.format(POLL_DATE_FORMAT).to_string()
}

/// State persisted across invocations by the host's state store. A single
/// scalar today: the last successfully polled message timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_poll_date: Option<String>,
}

impl ConnectorState {
    /// Parsed checkpoint, or `None` when no poll has completed yet. A
    /// malformed stored value is an error the caller must surface without
    /// advancing the checkpoint.
    pub fn checkpoint(&self) -> Result<Option<DateTime<Utc>>, StateError> {
        self.last_poll_date
            .as_deref()
            .map(parse_poll_date)
            .transpose()
    }

    /// Advance the checkpoint to `ts`, normalized to the wire format.
    pub fn advance(&mut self, ts: DateTime<Utc>) {
        self.last_poll_date = Some(format_poll_date(ts));
    }
}
