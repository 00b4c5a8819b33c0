//! Incremental poll cycle over all text-capable channels.
//!
//! Each cycle scans every qualifying channel for messages strictly newer
//! than the persisted checkpoint, creates one container plus one artifact
//! per new message, and persists the advanced checkpoint exactly once at
//! the end. A failure anywhere aborts the cycle without advancing the
//! checkpoint, so the next cycle re-scans from the old one (at-least-once).

use {
    chrono::{DateTime, Utc},
    tracing::{debug, info},
};

use {
    guildbeat_client::HistoryQuery,
    guildbeat_protocol::{ActionRequest, ActionResult, ParamError},
};

use crate::{
    error::{Error, Result},
    mapper,
    session::Connector,
};

pub async fn run_poll(connector: &Connector, request: &ActionRequest) -> Result<ActionResult> {
    let per_channel_cap = match request.i64_param("container_count") {
        Some(n) if n < 0 => {
            return Err(ParamError::invalid("container_count", format!("`{n}` is negative")).into());
        }
        Some(0) | None => None,
        Some(n) => Some(n as usize),
    };

    let state = connector.state();
    let checkpoint = state
        .checkpoint()
        .map_err(|_| Error::InvalidCheckpoint(state.last_poll_date.clone().unwrap_or_default()))?;
    let mut newest_seen = checkpoint.unwrap_or(DateTime::<Utc>::MIN_UTC);

    let api = connector.session().api();
    let channels = api.fetch_channels().await?;
    let mut containers_created = 0u64;

    for channel in channels.iter().filter(|c| c.kind.is_text_capable()) {
        let messages = api
            .message_history(
                channel.id,
                HistoryQuery {
                    after: checkpoint,
                    before: None,
                    limit: per_channel_cap,
                    oldest_first: true,
                },
            )
            .await?;
        debug!(
            channel_id = channel.id,
            channel_name = %channel.name,
            new_messages = messages.len(),
            "channel scanned"
        );

        for msg in messages {
            if msg.created_at > newest_seen {
                newest_seen = msg.created_at;
            }
            // The checkpoint message itself must not be re-containerized.
            if checkpoint.is_some_and(|cp| msg.created_at == cp) {
                continue;
            }

            let container_id = connector
                .host()
                .save_container(&mapper::container_for(&msg, channel))
                .await?;
            connector
                .host()
                .save_artifact(&mapper::poll_artifact(&container_id, &msg))
                .await?;
            containers_created += 1;
        }
    }

    // One state write per successful cycle, new messages or not.
    let mut state = state;
    if newest_seen > DateTime::<Utc>::MIN_UTC {
        state.advance(newest_seen);
    }
    connector.commit_state(state).await?;

    info!(containers_created, "poll cycle complete");
    Ok(ActionResult::success().with_summary("containers_created", containers_created))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use {async_trait::async_trait, secrecy::Secret, serde_json::json};

    use {
        super::*,
        crate::{
            dispatch::dispatch,
            host::{HostError, HostResult, MemoryHost, SoarHost},
            testutil,
            testutil::ScriptedApi,
            ConnectorConfig,
        },
        guildbeat_client::ChatApi,
        guildbeat_protocol::{Artifact, Container, Sensitivity},
    };

    fn config() -> ConnectorConfig {
        ConnectorConfig {
            token: Secret::new("Bot test-token".into()),
            guild_id: "99".into(),
        }
    }

    async fn connector_on(
        api: Arc<ScriptedApi>,
        host: Arc<dyn SoarHost>,
    ) -> Connector {
        Connector::initialize(api as Arc<dyn ChatApi>, host)
            .await
            .unwrap_or_else(|e| panic!("initialize: {e}"))
    }

    fn poll_request() -> ActionRequest {
        ActionRequest::new("on_poll", json!({}))
    }

    #[tokio::test]
    async fn poll_creates_container_and_artifact_per_new_message() {
        let mut with_evidence = testutil::message(2, 10, "2024-01-02 00:00:00");
        with_evidence.attachments.push(testutil::attachment("e.png"));
        let api = Arc::new(
            ScriptedApi::default()
                .with_message(testutil::message(1, 10, "2024-01-01 00:00:00"))
                .with_message(with_evidence),
        );
        let host = Arc::new(MemoryHost::new(config()));
        let connector = connector_on(Arc::clone(&api), Arc::clone(&host) as Arc<dyn SoarHost>).await;

        let result = dispatch(&connector, &poll_request()).await;
        assert!(result.success, "{:?}", result.message);
        assert_eq!(result.summary["containers_created"], 2);

        let containers = host.containers();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].name, "message 1 on channel general");
        assert_eq!(containers[0].sensitivity, Sensitivity::White);
        assert_eq!(containers[1].sensitivity, Sensitivity::Green);

        let artifacts = host.artifacts();
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].name, "message: 1");
        assert_eq!(artifacts[0].container_id, "container-1");

        // Checkpoint advanced to the newest message seen.
        assert_eq!(
            host.state(),
            json!({"last_poll_date": "2024-01-02 00:00:00"})
        );
    }

    #[tokio::test]
    async fn second_poll_with_no_new_messages_is_idempotent() {
        let api = Arc::new(
            ScriptedApi::default().with_message(testutil::message(1, 10, "2024-01-01 00:00:00")),
        );
        let host = Arc::new(MemoryHost::new(config()));
        let connector = connector_on(Arc::clone(&api), Arc::clone(&host) as Arc<dyn SoarHost>).await;

        let first = dispatch(&connector, &poll_request()).await;
        assert!(first.success);
        let checkpoint_after_first = host.state();

        let second = dispatch(&connector, &poll_request()).await;
        assert!(second.success);
        assert_eq!(second.summary["containers_created"], 0);
        assert_eq!(host.containers().len(), 1);
        assert_eq!(host.state(), checkpoint_after_first);
    }

    #[tokio::test]
    async fn poll_with_empty_guild_still_persists_state() {
        let api = Arc::new(ScriptedApi::default());
        let host = Arc::new(
            MemoryHost::new(config()).with_state(json!({"last_poll_date": "2024-01-01 00:00:00"})),
        );
        // Wipe the store so the cycle's own write is observable.
        let connector = connector_on(Arc::clone(&api), Arc::clone(&host) as Arc<dyn SoarHost>).await;
        host.save_state(&json!({}))
            .await
            .unwrap_or_else(|e| panic!("reset: {e}"));

        let result = dispatch(&connector, &poll_request()).await;
        assert!(result.success);
        assert_eq!(result.summary["containers_created"], 0);
        // Unchanged checkpoint was still written once.
        assert_eq!(
            host.state(),
            json!({"last_poll_date": "2024-01-01 00:00:00"})
        );
    }

    #[tokio::test]
    async fn poll_skips_messages_at_the_checkpoint_boundary() {
        let api = Arc::new(
            ScriptedApi::default()
                .with_message(testutil::message(1, 10, "2024-01-01 00:00:00"))
                .with_message(testutil::message(2, 10, "2024-01-02 00:00:00")),
        );
        let host = Arc::new(
            MemoryHost::new(config()).with_state(json!({"last_poll_date": "2024-01-01 00:00:00"})),
        );
        let connector = connector_on(Arc::clone(&api), Arc::clone(&host) as Arc<dyn SoarHost>).await;

        let result = dispatch(&connector, &poll_request()).await;
        assert!(result.success);
        assert_eq!(result.summary["containers_created"], 1);
        assert_eq!(host.containers()[0].name, "message 2 on channel general");
    }

    #[tokio::test]
    async fn poll_checkpoint_never_moves_backwards() {
        let api = Arc::new(
            ScriptedApi::default().with_message(testutil::message(1, 10, "2020-06-01 00:00:00")),
        );
        let host = Arc::new(
            MemoryHost::new(config()).with_state(json!({"last_poll_date": "2024-01-01 00:00:00"})),
        );
        let connector = connector_on(Arc::clone(&api), Arc::clone(&host) as Arc<dyn SoarHost>).await;

        let result = dispatch(&connector, &poll_request()).await;
        assert!(result.success);
        // The only message predates the checkpoint; nothing new, no regression.
        assert_eq!(result.summary["containers_created"], 0);
        assert_eq!(
            host.state(),
            json!({"last_poll_date": "2024-01-01 00:00:00"})
        );
    }

    #[tokio::test]
    async fn corrupt_checkpoint_aborts_without_advancing() {
        let api = Arc::new(
            ScriptedApi::default().with_message(testutil::message(1, 10, "2024-01-01 00:00:00")),
        );
        let host = Arc::new(
            MemoryHost::new(config()).with_state(json!({"last_poll_date": "yesterday-ish"})),
        );
        let connector = connector_on(Arc::clone(&api), Arc::clone(&host) as Arc<dyn SoarHost>).await;

        let result = dispatch(&connector, &poll_request()).await;
        assert!(!result.success);
        assert!(host.containers().is_empty());
        assert_eq!(host.state(), json!({"last_poll_date": "yesterday-ish"}));
    }

    #[tokio::test]
    async fn negative_container_count_fails_before_any_remote_call() {
        let api = Arc::new(ScriptedApi::default());
        let host = Arc::new(MemoryHost::new(config()));
        let connector = connector_on(Arc::clone(&api), host).await;

        let result = dispatch(
            &connector,
            &ActionRequest::new("on_poll", json!({"container_count": -5})),
        )
        .await;
        assert!(!result.success);
        assert_eq!(api.calls(), vec!["fetch_guild"]);
    }

    #[tokio::test]
    async fn container_count_caps_each_channel_scan() {
        let api = Arc::new(
            ScriptedApi::default()
                .with_message(testutil::message(1, 10, "2024-01-01 00:00:00"))
                .with_message(testutil::message(2, 10, "2024-01-02 00:00:00"))
                .with_message(testutil::message(3, 10, "2024-01-03 00:00:00")),
        );
        let host = Arc::new(MemoryHost::new(config()));
        let connector = connector_on(Arc::clone(&api), Arc::clone(&host) as Arc<dyn SoarHost>).await;

        let result = dispatch(
            &connector,
            &ActionRequest::new("on_poll", json!({"container_count": 2})),
        )
        .await;
        assert!(result.success);
        assert_eq!(result.summary["containers_created"], 2);
        // Oldest messages first under the cap.
        assert_eq!(host.containers()[0].name, "message 1 on channel general");
        assert_eq!(host.containers()[1].name, "message 2 on channel general");
    }

    /// Host whose container saves always fail; everything else delegates.
    struct BrokenContainerHost {
        inner: MemoryHost,
    }

    #[async_trait]
    impl SoarHost for BrokenContainerHost {
        fn config(&self) -> HostResult<ConnectorConfig> {
            self.inner.config()
        }

        fn container_id(&self) -> String {
            self.inner.container_id()
        }

        async fn save_artifact(&self, artifact: &Artifact) -> HostResult<String> {
            self.inner.save_artifact(artifact).await
        }

        async fn save_container(&self, _container: &Container) -> HostResult<String> {
            Err(HostError::new("container store unavailable"))
        }

        async fn load_state(&self) -> HostResult<serde_json::Value> {
            self.inner.load_state().await
        }

        async fn save_state(&self, state: &serde_json::Value) -> HostResult<()> {
            self.inner.save_state(state).await
        }
    }

    #[tokio::test]
    async fn container_save_failure_aborts_cycle_without_advancing() {
        let api = Arc::new(
            ScriptedApi::default().with_message(testutil::message(1, 10, "2024-01-01 00:00:00")),
        );
        let host = Arc::new(BrokenContainerHost {
            inner: MemoryHost::new(config()),
        });
        let connector = connector_on(Arc::clone(&api), Arc::clone(&host) as Arc<dyn SoarHost>).await;

        let result = dispatch(&connector, &poll_request()).await;
        assert!(!result.success);
        assert!(result
            .message
            .unwrap_or_default()
            .contains("container store unavailable"));
        // Checkpoint untouched.
        assert_eq!(host.inner.state(), json!({}));
    }
}
