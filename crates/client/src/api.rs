use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
};

use crate::error::ApiResult;

/// The guild the session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildInfo {
    pub id: u64,
    pub name: String,
}

/// Channel kinds the connector distinguishes. Everything it does not care
/// about collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
    Stage,
    Category,
    Other,
}

impl ChannelKind {
    /// Channels that carry a message stream. Voice and stage channels have
    /// text chat attached, so they qualify alongside plain text channels.
    pub fn is_text_capable(&self) -> bool {
        matches!(self, Self::Text | Self::Voice | Self::Stage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: u64,
    pub name: String,
    pub kind: ChannelKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentInfo {
    pub filename: String,
    pub url: String,
    pub description: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedInfo {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

/// A fetched message, flattened to what the mapper needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    pub id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub jump_url: String,
    /// Names of the message flags that are set, lowercase.
    pub flags: Vec<String>,
    pub attachments: Vec<AttachmentInfo>,
    pub embeds: Vec<EmbedInfo>,
}

impl MessageInfo {
    pub fn has_evidence(&self) -> bool {
        !self.attachments.is_empty() || !self.embeds.is_empty()
    }
}

/// A guild member, flattened for the `get_user` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub id: u64,
    pub name: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub system: bool,
    /// Names of the public user flags that are set, lowercase.
    pub public_flags: Vec<String>,
}

/// Bounds for a history scan. `after`/`before` are exclusive; `limit` caps
/// the number of returned messages; results are assembled oldest-first and
/// reversed when `oldest_first` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub oldest_first: bool,
}

/// Uniform call-and-result contract over the chat platform. Every method
/// performs exactly one remote operation, makes a single attempt, and
/// classifies failures; retrying is the caller's decision.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn fetch_guild(&self) -> ApiResult<GuildInfo>;
    async fn fetch_channel(&self, channel_id: u64) -> ApiResult<ChannelInfo>;
    async fn fetch_channels(&self) -> ApiResult<Vec<ChannelInfo>>;
    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> ApiResult<MessageInfo>;
    async fn fetch_member(&self, user_id: u64) -> ApiResult<MemberInfo>;
    async fn send_message(&self, channel_id: u64, content: &str) -> ApiResult<MessageInfo>;
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> ApiResult<()>;
    async fn kick_member(&self, user_id: u64, reason: &str) -> ApiResult<()>;
    async fn ban_member(
        &self,
        user_id: u64,
        reason: &str,
        delete_message_seconds: u64,
    ) -> ApiResult<()>;
    async fn message_history(
        &self,
        channel_id: u64,
        query: HistoryQuery,
    ) -> ApiResult<Vec<MessageInfo>>;
}
