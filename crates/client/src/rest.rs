//! Serenity-backed implementation of the remote client adapter.
//!
//! REST-only: the connector is invoked once per action by the host, so
//! there is no resident gateway connection. Every trait method maps to a
//! single Discord REST call; serenity failures are classified at this
//! boundary and never propagate as raw SDK errors.

use std::sync::Arc;

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    serenity::{
        all::{Channel, ChannelId, ChannelType, GuildId, Message, MessageId, UserId},
        builder::{CreateMessage, GetMessages},
        http::Http,
    },
    tracing::debug,
};

use crate::{
    api::{
        AttachmentInfo, ChannelInfo, ChannelKind, ChatApi, EmbedInfo, GuildInfo, HistoryQuery,
        MemberInfo, MessageInfo,
    },
    error::{ApiError, ApiResult, context},
};

/// Discord snowflake epoch (2015-01-01T00:00:00.000Z) in Unix milliseconds.
const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Discord returns at most 100 messages per history page.
const HISTORY_PAGE: u8 = 100;

/// Serenity REST adapter bound to one guild.
pub struct SerenityApi {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl SerenityApi {
    pub fn new(token: &str, guild_id: u64) -> Self {
        Self {
            http: Arc::new(Http::new(token)),
            guild_id: GuildId::new(guild_id),
        }
    }
}

/// Map a serenity failure to the adapter's error taxonomy: API-level
/// failures keep the operation's static context message, anything else is
/// wrapped generically.
fn classify(ctx: &'static str, err: serenity::Error) -> ApiError {
    match &err {
        serenity::Error::Http(inner) => ApiError::discord(ctx, "Http", inner.to_string()),
        serenity::Error::Model(inner) => {
            ApiError::discord(ctx, "Model", format!("{inner:?}"))
        },
        serenity::Error::Io(inner) => ApiError::unexpected("Io", inner.to_string()),
        serenity::Error::Json(inner) => ApiError::unexpected("Json", inner.to_string()),
        other => ApiError::unexpected("Other", other.to_string()),
    }
}

fn utc_from_timestamp(ts: serenity::model::Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.unix_timestamp(), 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn utc_from_snowflake(id: u64) -> DateTime<Utc> {
    let ms = ((id >> 22) as i64).saturating_add(DISCORD_EPOCH_MS);
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Lowest snowflake that can carry the given creation time. Clamped to 1
/// because Discord ids are non-zero; `None` means "from the beginning".
fn snowflake_floor(ts: Option<DateTime<Utc>>) -> u64 {
    let Some(ts) = ts else { return 1 };
    let ms = ts.timestamp_millis().saturating_sub(DISCORD_EPOCH_MS);
    if ms <= 0 {
        1
    } else {
        (ms as u64).saturating_mul(1 << 22)
    }
}

/// Discord's ban endpoint measures message retention in days (max 7);
/// the action surface speaks seconds.
fn retention_days(delete_message_seconds: u64) -> u8 {
    (delete_message_seconds / 86_400).min(7) as u8
}

fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text | ChannelType::News => ChannelKind::Text,
        ChannelType::Voice => ChannelKind::Voice,
        ChannelType::Stage => ChannelKind::Stage,
        ChannelType::Category => ChannelKind::Category,
        _ => ChannelKind::Other,
    }
}

fn message_info(msg: Message) -> MessageInfo {
    let flags = msg
        .flags
        .map(|flags| {
            flags
                .iter_names()
                .map(|(name, _)| name.to_ascii_lowercase())
                .collect()
        })
        .unwrap_or_default();
    MessageInfo {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        author_id: msg.author.id.get(),
        author_name: msg.author.name.clone(),
        content: msg.content.clone(),
        created_at: utc_from_timestamp(msg.timestamp),
        edited_at: msg.edited_timestamp.map(utc_from_timestamp),
        jump_url: msg.link(),
        flags,
        attachments: msg
            .attachments
            .iter()
            .map(|a| AttachmentInfo {
                filename: a.filename.clone(),
                url: a.url.clone(),
                description: a.description.clone(),
                content_type: a.content_type.clone(),
            })
            .collect(),
        embeds: msg
            .embeds
            .iter()
            .map(|e| EmbedInfo {
                title: e.title.clone(),
                url: e.url.clone(),
                description: e.description.clone(),
            })
            .collect(),
    }
}

#[async_trait]
impl ChatApi for SerenityApi {
    async fn fetch_guild(&self) -> ApiResult<GuildInfo> {
        let guild = self
            .http
            .get_guild(self.guild_id)
            .await
            .map_err(|e| classify(context::FETCHING_GUILD, e))?;
        Ok(GuildInfo {
            id: guild.id.get(),
            name: guild.name.clone(),
        })
    }

    async fn fetch_channel(&self, channel_id: u64) -> ApiResult<ChannelInfo> {
        let channel = self
            .http
            .get_channel(ChannelId::new(channel_id))
            .await
            .map_err(|e| classify(context::FETCHING_CHANNEL, e))?;
        match channel {
            Channel::Guild(gc) => Ok(ChannelInfo {
                id: gc.id.get(),
                name: gc.name.clone(),
                kind: channel_kind(gc.kind),
            }),
            Channel::Private(pc) => Ok(ChannelInfo {
                id: pc.id.get(),
                name: pc.name(),
                kind: ChannelKind::Text,
            }),
            other => Err(ApiError::discord(
                context::FETCHING_CHANNEL,
                "Model",
                format!("unsupported channel kind: {other:?}"),
            )),
        }
    }

    async fn fetch_channels(&self) -> ApiResult<Vec<ChannelInfo>> {
        let channels = self
            .http
            .get_channels(self.guild_id)
            .await
            .map_err(|e| classify(context::FETCHING_CHANNEL, e))?;
        Ok(channels
            .iter()
            .map(|gc| ChannelInfo {
                id: gc.id.get(),
                name: gc.name.clone(),
                kind: channel_kind(gc.kind),
            })
            .collect())
    }

    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> ApiResult<MessageInfo> {
        let msg = ChannelId::new(channel_id)
            .message(self.http.as_ref(), MessageId::new(message_id))
            .await
            .map_err(|e| classify(context::FETCHING_MESSAGE, e))?;
        Ok(message_info(msg))
    }

    async fn fetch_member(&self, user_id: u64) -> ApiResult<MemberInfo> {
        let member = self
            .guild_id
            .member(self.http.as_ref(), UserId::new(user_id))
            .await
            .map_err(|e| classify(context::FETCHING_MEMBER, e))?;
        let public_flags = member
            .user
            .public_flags
            .map(|flags| {
                flags
                    .iter_names()
                    .map(|(name, _)| name.to_ascii_lowercase())
                    .collect()
            })
            .unwrap_or_default();
        Ok(MemberInfo {
            id: member.user.id.get(),
            name: member.user.name.clone(),
            display_name: member.display_name().to_string(),
            created_at: utc_from_snowflake(member.user.id.get()),
            system: member.user.system,
            public_flags,
        })
    }

    async fn send_message(&self, channel_id: u64, content: &str) -> ApiResult<MessageInfo> {
        let msg = ChannelId::new(channel_id)
            .send_message(self.http.as_ref(), CreateMessage::new().content(content))
            .await
            .map_err(|e| classify(context::SENDING_MESSAGE, e))?;
        Ok(message_info(msg))
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> ApiResult<()> {
        ChannelId::new(channel_id)
            .delete_message(self.http.as_ref(), MessageId::new(message_id))
            .await
            .map_err(|e| classify(context::DELETING_MESSAGE, e))
    }

    async fn kick_member(&self, user_id: u64, reason: &str) -> ApiResult<()> {
        self.guild_id
            .kick_with_reason(self.http.as_ref(), UserId::new(user_id), reason)
            .await
            .map_err(|e| classify(context::KICKING_MEMBER, e))
    }

    async fn ban_member(
        &self,
        user_id: u64,
        reason: &str,
        delete_message_seconds: u64,
    ) -> ApiResult<()> {
        self.guild_id
            .ban_with_reason(
                self.http.as_ref(),
                UserId::new(user_id),
                retention_days(delete_message_seconds),
                reason,
            )
            .await
            .map_err(|e| classify(context::BANNING_MEMBER, e))
    }

    async fn message_history(
        &self,
        channel_id: u64,
        query: HistoryQuery,
    ) -> ApiResult<Vec<MessageInfo>> {
        let channel = ChannelId::new(channel_id);
        let mut collected: Vec<MessageInfo> = Vec::new();
        let mut anchor = snowflake_floor(query.after);
        // Snowflake ceiling: stop paging once the anchor passes it.
        let stop = query.before.map(|before| snowflake_floor(Some(before)));

        loop {
            let filter = GetMessages::new()
                .after(MessageId::new(anchor))
                .limit(HISTORY_PAGE);
            let mut page = channel
                .messages(self.http.as_ref(), filter)
                .await
                .map_err(|e| classify(context::FETCHING_HISTORY, e))?;
            if page.is_empty() {
                break;
            }
            // Pages come back newest-first; assemble oldest-first.
            page.sort_by_key(|m| m.id);
            anchor = page.last().map(|m| m.id.get()).unwrap_or(anchor);
            let page_len = page.len();
            collected.extend(page.into_iter().map(message_info));

            if page_len < usize::from(HISTORY_PAGE) {
                break;
            }
            if query.limit.is_some_and(|limit| collected.len() >= limit) {
                break;
            }
            if stop.is_some_and(|s| anchor >= s) {
                break;
            }
        }

        if let Some(after) = query.after {
            collected.retain(|m| m.created_at > after);
        }
        if let Some(before) = query.before {
            collected.retain(|m| m.created_at < before);
        }
        if !query.oldest_first {
            collected.reverse();
        }
        if let Some(limit) = query.limit {
            collected.truncate(limit);
        }

        debug!(
            channel_id,
            count = collected.len(),
            "message history page scan complete"
        );
        Ok(collected)
    }
}
