//! Action routing: one handler per recognized action identifier.
//!
//! Every handler validates its parameters before touching the network,
//! performs its remote calls through the session's adapter, and returns
//! exactly one [`ActionResult`]. Failures of any shape are folded into a
//! failed result here, at the boundary; nothing below panics or retries.

use tracing::{info, warn};

use guildbeat_protocol::{parse_poll_date, Action, ActionRequest, ActionResult, ParamError};

use {
    crate::{
        error::{Error, Result},
        mapper, poll,
        session::Connector,
    },
    guildbeat_client::HistoryQuery,
    guildbeat_protocol::format_poll_date,
};

/// Route one request to its handler. Unknown identifiers fail explicitly
/// instead of being silently ignored.
pub async fn dispatch(connector: &Connector, request: &ActionRequest) -> ActionResult {
    let Some(action) = Action::parse(&request.action) else {
        let err = Error::UnknownAction(request.action.clone());
        warn!(action = %request.action, "rejecting unrecognized action");
        return ActionResult::failure(err.to_string());
    };

    info!(action = action.as_str(), "handling action");
    let outcome = match action {
        Action::TestConnectivity => test_connectivity(connector).await,
        Action::FetchMessage => fetch_message(connector, request).await,
        Action::DeleteMessage => delete_message(connector, request).await,
        Action::ListChannels => list_channels(connector).await,
        Action::SendMessage => send_message(connector, request).await,
        Action::KickUser => kick_user(connector, request).await,
        Action::BanUser => ban_user(connector, request).await,
        Action::FetchMessageHistory => fetch_message_history(connector, request).await,
        Action::GetUser => get_user(connector, request).await,
        Action::OnPoll => poll::run_poll(connector, request).await,
    };

    outcome.unwrap_or_else(|err| {
        warn!(action = action.as_str(), error = %err, "action failed");
        ActionResult::failure(err.to_string())
    })
}

/// Re-resolves the configured guild as a liveness probe.
async fn test_connectivity(connector: &Connector) -> Result<ActionResult> {
    connector.session().api().fetch_guild().await?;
    let mut result = ActionResult::success();
    result.message = Some("Test Connectivity Passed".into());
    Ok(result)
}

async fn fetch_message(connector: &Connector, request: &ActionRequest) -> Result<ActionResult> {
    let channel_id = request.require_id("channel_id")?;
    let message_id = request.require_id("message_id")?;

    let api = connector.session().api();
    let channel = api.fetch_channel(channel_id).await?;
    let msg = api.fetch_message(channel_id, message_id).await?;

    let container_id = connector.host().container_id();
    let (attachment_ids, embed_ids) =
        mapper::save_message_artifacts(connector.host(), &container_id, &msg).await?;

    let mut result = ActionResult::success();
    result.add_data(mapper::message_record(&msg, &channel, &attachment_ids, &embed_ids));
    result.set_summary(
        "action_result",
        format!("fetching message {message_id} ended with success"),
    );
    Ok(result)
}

/// Fetches the message first so a stale id fails with the fetch context
/// rather than a bare delete error.
async fn delete_message(connector: &Connector, request: &ActionRequest) -> Result<ActionResult> {
    let channel_id = request.require_id("channel_id")?;
    let message_id = request.require_id("message_id")?;

    let api = connector.session().api();
    api.fetch_message(channel_id, message_id).await?;
    api.delete_message(channel_id, message_id).await?;

    Ok(ActionResult::success().with_summary(
        "action_result",
        format!("deleting message {message_id} ended with success"),
    ))
}

async fn list_channels(connector: &Connector) -> Result<ActionResult> {
    let channels = connector.session().api().fetch_channels().await?;

    let mut result = ActionResult::success();
    let mut count = 0u64;
    for channel in channels.iter().filter(|c| c.kind.is_text_capable()) {
        count += 1;
        result.add_data(serde_json::json!({
            "name": channel.name,
            "id": channel.id.to_string(),
        }));
    }
    result.set_summary("num_channels", count);
    Ok(result)
}

async fn send_message(connector: &Connector, request: &ActionRequest) -> Result<ActionResult> {
    let destination = request.require_id("destination")?;
    let content = request.require_str("message")?;

    let api = connector.session().api();
    api.fetch_channel(destination).await?;
    let sent = api.send_message(destination, content).await?;

    let mut result = ActionResult::success();
    result.add_data(serde_json::json!({"message_id": sent.id.to_string()}));
    Ok(result)
}

async fn kick_user(connector: &Connector, request: &ActionRequest) -> Result<ActionResult> {
    let user_id = request.require_id("user_id")?;
    let reason = request.str_param("reason").unwrap_or_default();

    let api = connector.session().api();
    api.fetch_member(user_id).await?;
    api.kick_member(user_id, reason).await?;

    Ok(ActionResult::success()
        .with_summary("action_result", format!("kicking user {user_id} ended with success")))
}

async fn ban_user(connector: &Connector, request: &ActionRequest) -> Result<ActionResult> {
    let user_id = request.require_id("user_id")?;
    let reason = request.str_param("reason").unwrap_or_default();
    let delete_message_seconds = request.u64_param("delete_message_seconds", 86_400);

    let api = connector.session().api();
    api.fetch_member(user_id).await?;
    api.ban_member(user_id, reason, delete_message_seconds).await?;

    Ok(ActionResult::success()
        .with_summary("action_result", format!("banning user {user_id} ended with success")))
}

async fn get_user(connector: &Connector, request: &ActionRequest) -> Result<ActionResult> {
    let user_id = request.require_id("user_id")?;

    let member = connector.session().api().fetch_member(user_id).await?;

    let mut result = ActionResult::success();
    result.add_data(serde_json::json!({
        "display_name": member.display_name,
        "name": member.name,
        "created_at": format_poll_date(member.created_at),
        "system": member.system,
        "public_flags": member.public_flags,
    }));
    Ok(result)
}

async fn fetch_message_history(
    connector: &Connector,
    request: &ActionRequest,
) -> Result<ActionResult> {
    let channel_id = request.require_id("channel_id")?;

    // All bounds are validated up front; no remote call happens on bad input.
    let limit = match request.i64_param("limit") {
        Some(n) if n < 0 => {
            return Err(ParamError::invalid("limit", format!("`{n}` is negative")).into());
        }
        Some(0) | None => None,
        Some(n) => Some(n as usize),
    };
    let after = request
        .str_param("fetching_start_date")
        .map(|raw| parse_poll_date(raw).map_err(|_| Error::InvalidDate(raw.to_string())))
        .transpose()?;
    let before = request
        .str_param("fetching_end_date")
        .map(|raw| parse_poll_date(raw).map_err(|_| Error::InvalidDate(raw.to_string())))
        .transpose()?;
    let oldest_first = request.bool_param("oldest_first", true);

    let api = connector.session().api();
    api.fetch_channel(channel_id).await?;
    let messages = api
        .message_history(
            channel_id,
            HistoryQuery {
                after,
                before,
                limit,
                oldest_first,
            },
        )
        .await?;

    let mut result = ActionResult::success();
    for msg in &messages {
        result.add_data(mapper::message_summary(msg));
    }
    result.set_summary("num_messages", messages.len() as u64);
    Ok(result)
}
