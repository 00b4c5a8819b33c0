//! Core of the guildbeat Discord SOAR connector.
//!
//! Maps host-issued action requests onto the Discord guild/channel/message
//! API through the remote client adapter, normalizes results into the
//! host's artifact/container model, and tracks the poll checkpoint across
//! invocations. The host platform is abstracted behind [`host::SoarHost`];
//! the chat platform behind `guildbeat_client::ChatApi`.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod mapper;
pub mod poll;
pub mod session;

#[cfg(test)]
mod testutil;

pub use {
    config::ConnectorConfig,
    error::{Error, Result},
    host::{HostError, HostResult, MemoryHost, SoarHost},
    session::{Connector, Session},
};
