//! Session establishment and the connector lifecycle.
//!
//! A [`Session`] binds the remote client to the configured guild once, at
//! initialization; every later action reuses it. The [`Connector`] wraps a
//! session together with the host seam and the persisted poll state.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use {
    guildbeat_client::{ChatApi, GuildInfo},
    guildbeat_protocol::{ActionRequest, ActionResult, ConnectorState},
};

use crate::{
    dispatch,
    error::{Error, Result},
    host::{HostError, SoarHost},
};

/// An established binding to the configured guild. Immutable once built.
pub struct Session {
    api: Arc<dyn ChatApi>,
    guild: GuildInfo,
}

impl Session {
    /// Resolve the configured guild through the remote client. Failure
    /// here is fatal to initialization; no action runs without a session.
    pub async fn establish(api: Arc<dyn ChatApi>) -> Result<Self> {
        let guild = api.fetch_guild().await?;
        info!(guild_id = guild.id, guild_name = %guild.name, "session established");
        Ok(Self { api, guild })
    }

    pub fn api(&self) -> &dyn ChatApi {
        self.api.as_ref()
    }

    pub fn guild(&self) -> &GuildInfo {
        &self.guild
    }
}

/// The connector proper: one instance per invocation of the host.
pub struct Connector {
    session: Session,
    host: Arc<dyn SoarHost>,
    state: Mutex<ConnectorState>,
}

impl Connector {
    /// Validate config, recover persisted state, and establish the guild
    /// session. Unreadable state is reset to empty and re-persisted;
    /// a failing state store or unreachable guild aborts initialization.
    pub async fn initialize(api: Arc<dyn ChatApi>, host: Arc<dyn SoarHost>) -> Result<Self> {
        host.config()?.validate()?;
        let state = recover_state(host.as_ref()).await?;
        let session = Session::establish(api).await?;
        Ok(Self {
            session,
            host,
            state: Mutex::new(state),
        })
    }

    /// Run one action request to completion. Never returns an error:
    /// every failure is folded into a failed [`ActionResult`].
    pub async fn handle(&self, request: &ActionRequest) -> ActionResult {
        dispatch::dispatch(self, request).await
    }

    /// Persist the current state one final time before shutdown.
    pub async fn finalize(&self) -> Result<()> {
        self.persist_state().await
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn host(&self) -> &dyn SoarHost {
        self.host.as_ref()
    }

    pub fn state(&self) -> ConnectorState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the in-memory state and persist it through the host.
    pub(crate) async fn commit_state(&self, state: ConnectorState) -> Result<()> {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
        self.persist_state().await
    }

    async fn persist_state(&self) -> Result<()> {
        let value = state_value(&self.state())?;
        self.host.save_state(&value).await?;
        Ok(())
    }
}

fn state_value(state: &ConnectorState) -> Result<serde_json::Value> {
    serde_json::to_value(state)
        .map_err(|e| Error::Host(HostError::new(format!("state not serializable: {e}"))))
}

/// Strict parse of the persisted state; anything unreadable is dropped,
/// logged, and replaced with a fresh empty state so one bad write cannot
/// wedge the connector permanently.
async fn recover_state(host: &dyn SoarHost) -> Result<ConnectorState> {
    let raw = host.load_state().await?;
    match serde_json::from_value::<ConnectorState>(raw) {
        Ok(state) => Ok(state),
        Err(err) => {
            warn!(%err, "persisted state unreadable, resetting to empty");
            let reset = ConnectorState::default();
            host.save_state(&state_value(&reset)?).await?;
            Ok(reset)
        }
    }
}
