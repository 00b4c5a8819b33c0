//! Scripted in-memory `ChatApi` used across the connector tests.

#![allow(clippy::unwrap_used)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use {async_trait::async_trait, chrono::{DateTime, Utc}};

use guildbeat_client::{
    error::context, ApiError, ApiResult, AttachmentInfo, ChannelInfo, ChannelKind, ChatApi,
    EmbedInfo, GuildInfo, HistoryQuery, MemberInfo, MessageInfo,
};
use guildbeat_protocol::parse_poll_date;

pub fn ts(raw: &str) -> DateTime<Utc> {
    parse_poll_date(raw).unwrap_or_else(|e| panic!("fixture date `{raw}`: {e}"))
}

pub fn channel(id: u64, name: &str, kind: ChannelKind) -> ChannelInfo {
    ChannelInfo {
        id,
        name: name.into(),
        kind,
    }
}

pub fn message(id: u64, channel_id: u64, created: &str) -> MessageInfo {
    MessageInfo {
        id,
        channel_id,
        author_id: 500,
        author_name: "alice".into(),
        content: format!("content of {id}"),
        created_at: ts(created),
        edited_at: None,
        jump_url: format!("https://discord.com/channels/99/{channel_id}/{id}"),
        flags: Vec::new(),
        attachments: Vec::new(),
        embeds: Vec::new(),
    }
}

pub fn member(id: u64, name: &str) -> MemberInfo {
    MemberInfo {
        id,
        name: name.into(),
        display_name: format!("{name}-display"),
        created_at: ts("2020-05-01 12:00:00"),
        system: false,
        public_flags: Vec::new(),
    }
}

pub fn attachment(filename: &str) -> AttachmentInfo {
    AttachmentInfo {
        filename: filename.into(),
        url: format!("https://cdn.discordapp.com/{filename}"),
        description: None,
        content_type: Some("image/png".into()),
    }
}

pub fn embed(title: &str) -> EmbedInfo {
    EmbedInfo {
        title: Some(title.into()),
        url: Some("https://example.com".into()),
        description: Some("embedded".into()),
    }
}

/// Canned `ChatApi` that records every call and can be told to fail
/// specific operations.
pub struct ScriptedApi {
    guild: GuildInfo,
    channels: Vec<ChannelInfo>,
    messages: HashMap<(u64, u64), MessageInfo>,
    history: HashMap<u64, Vec<MessageInfo>>,
    members: HashMap<u64, MemberInfo>,
    failures: HashSet<String>,
    calls: Mutex<Vec<String>>,
    sent: Mutex<Vec<(u64, String)>>,
    deleted: Mutex<Vec<(u64, u64)>>,
    kicks: Mutex<Vec<(u64, String)>>,
    bans: Mutex<Vec<(u64, String, u64)>>,
    history_queries: Mutex<Vec<(u64, HistoryQuery)>>,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self {
            guild: GuildInfo {
                id: 99,
                name: "ops-guild".into(),
            },
            channels: vec![
                channel(10, "general", ChannelKind::Text),
                channel(11, "war-room", ChannelKind::Voice),
                channel(12, "archive", ChannelKind::Category),
            ],
            messages: HashMap::new(),
            history: HashMap::new(),
            members: HashMap::new(),
            failures: HashSet::new(),
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            kicks: Mutex::new(Vec::new()),
            bans: Mutex::new(Vec::new()),
            history_queries: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedApi {
    /// Make `op` fail on every call with an injected Discord error.
    pub fn fail_on(mut self, op: &str) -> Self {
        self.failures.insert(op.to_string());
        self
    }

    pub fn with_channels(mut self, channels: Vec<ChannelInfo>) -> Self {
        self.channels = channels;
        self
    }

    /// Register a message; it becomes fetchable and part of its channel's
    /// history (kept oldest-first).
    pub fn with_message(mut self, msg: MessageInfo) -> Self {
        let stream = self.history.entry(msg.channel_id).or_default();
        stream.push(msg.clone());
        stream.sort_by_key(|m| (m.created_at, m.id));
        self.messages.insert((msg.channel_id, msg.id), msg);
        self
    }

    pub fn with_member(mut self, member: MemberInfo) -> Self {
        self.members.insert(member.id, member);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(u64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<(u64, u64)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn kicks(&self) -> Vec<(u64, String)> {
        self.kicks.lock().unwrap().clone()
    }

    pub fn bans(&self) -> Vec<(u64, String, u64)> {
        self.bans.lock().unwrap().clone()
    }

    pub fn history_queries(&self) -> Vec<(u64, HistoryQuery)> {
        self.history_queries.lock().unwrap().clone()
    }

    fn record(&self, op: &str, ctx: &'static str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(op.to_string());
        if self.failures.contains(op) {
            return Err(ApiError::discord(ctx, "Http", "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatApi for ScriptedApi {
    async fn fetch_guild(&self) -> ApiResult<GuildInfo> {
        self.record("fetch_guild", context::FETCHING_GUILD)?;
        Ok(self.guild.clone())
    }

    async fn fetch_channel(&self, channel_id: u64) -> ApiResult<ChannelInfo> {
        self.record("fetch_channel", context::FETCHING_CHANNEL)?;
        self.channels
            .iter()
            .find(|c| c.id == channel_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::discord(context::FETCHING_CHANNEL, "Http", "404 Not Found")
            })
    }

    async fn fetch_channels(&self) -> ApiResult<Vec<ChannelInfo>> {
        self.record("fetch_channels", context::FETCHING_CHANNEL)?;
        Ok(self.channels.clone())
    }

    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> ApiResult<MessageInfo> {
        self.record("fetch_message", context::FETCHING_MESSAGE)?;
        self.messages
            .get(&(channel_id, message_id))
            .cloned()
            .ok_or_else(|| {
                ApiError::discord(context::FETCHING_MESSAGE, "Http", "404 Not Found")
            })
    }

    async fn fetch_member(&self, user_id: u64) -> ApiResult<MemberInfo> {
        self.record("fetch_member", context::FETCHING_MEMBER)?;
        self.members.get(&user_id).cloned().ok_or_else(|| {
            ApiError::discord(context::FETCHING_MEMBER, "Http", "404 Not Found")
        })
    }

    async fn send_message(&self, channel_id: u64, content: &str) -> ApiResult<MessageInfo> {
        self.record("send_message", context::SENDING_MESSAGE)?;
        self.sent.lock().unwrap().push((channel_id, content.into()));
        let mut msg = message(9000 + self.sent.lock().unwrap().len() as u64, channel_id, "2024-06-01 00:00:00");
        msg.content = content.into();
        Ok(msg)
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> ApiResult<()> {
        self.record("delete_message", context::DELETING_MESSAGE)?;
        self.deleted.lock().unwrap().push((channel_id, message_id));
        Ok(())
    }

    async fn kick_member(&self, user_id: u64, reason: &str) -> ApiResult<()> {
        self.record("kick_member", context::KICKING_MEMBER)?;
        self.kicks.lock().unwrap().push((user_id, reason.into()));
        Ok(())
    }

    async fn ban_member(
        &self,
        user_id: u64,
        reason: &str,
        delete_message_seconds: u64,
    ) -> ApiResult<()> {
        self.record("ban_member", context::BANNING_MEMBER)?;
        self.bans
            .lock()
            .unwrap()
            .push((user_id, reason.into(), delete_message_seconds));
        Ok(())
    }

    async fn message_history(
        &self,
        channel_id: u64,
        query: HistoryQuery,
    ) -> ApiResult<Vec<MessageInfo>> {
        self.record("message_history", context::FETCHING_HISTORY)?;
        self.history_queries
            .lock()
            .unwrap()
            .push((channel_id, query.clone()));
        let mut stream: Vec<MessageInfo> = self
            .history
            .get(&channel_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|m| query.after.map_or(true, |after| m.created_at > after))
            .filter(|m| query.before.map_or(true, |before| m.created_at < before))
            .collect();
        if !query.oldest_first {
            stream.reverse();
        }
        if let Some(limit) = query.limit {
            stream.truncate(limit);
        }
        Ok(stream)
    }
}
