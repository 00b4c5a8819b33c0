//! Remote client adapter for the guildbeat connector.
//!
//! Wraps the Discord guild/channel/message REST surface behind the
//! [`api::ChatApi`] trait: one blocking remote operation per call, a single
//! attempt, and a classified error on failure. The serenity-backed
//! implementation lives in [`rest`]; the connector core only ever sees the
//! plain info structs defined in [`api`].

pub mod api;
pub mod error;
pub mod rest;

pub use {
    api::{
        AttachmentInfo, ChannelInfo, ChannelKind, ChatApi, EmbedInfo, GuildInfo, HistoryQuery,
        MemberInfo, MessageInfo,
    },
    error::{ApiError, ApiResult},
    rest::SerenityApi,
};
