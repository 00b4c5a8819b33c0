//! Conversion of fetched Discord entities into the host's artifact,
//! container, and normalized-record shapes.

use {serde_json::Value, tracing::debug};

use {
    guildbeat_client::{AttachmentInfo, ChannelInfo, EmbedInfo, MessageInfo},
    guildbeat_protocol::{Artifact, Cef, Container, Sensitivity, format_poll_date},
};

use crate::{error::Result, host::SoarHost};

/// Rendered when a message was never edited.
pub const NOT_EDITED: &str = "message was not edited";
/// Rendered when no message flag is set.
pub const NO_FLAGS: &str = "no flags";
pub const NO_ATTACHMENTS: &str = "no attachments";
pub const NO_EMBEDS: &str = "no embeds";

/// Fixed description for containers created by polling.
pub const CONTAINER_DESCRIPTION: &str = "message ingested from Discord";

pub fn embed_artifact(container_id: &str, embed: &EmbedInfo) -> Artifact {
    Artifact {
        container_id: container_id.to_string(),
        name: format!("embed: {}", embed.title.as_deref().unwrap_or_default()),
        cef: Cef {
            url: embed.url.clone().unwrap_or_default(),
            content_type: String::new(),
            description: embed.description.clone().unwrap_or_default(),
        },
    }
}

pub fn attachment_artifact(container_id: &str, attachment: &AttachmentInfo) -> Artifact {
    Artifact {
        container_id: container_id.to_string(),
        name: format!("attachment: {}", attachment.filename),
        cef: Cef {
            url: attachment.url.clone(),
            content_type: attachment.content_type.clone().unwrap_or_default(),
            description: attachment.description.clone().unwrap_or_default(),
        },
    }
}

/// Artifact recorded for each newly observed message during polling.
pub fn poll_artifact(container_id: &str, msg: &MessageInfo) -> Artifact {
    Artifact {
        container_id: container_id.to_string(),
        name: format!("message: {}", msg.id),
        cef: Cef {
            url: msg.jump_url.clone(),
            content_type: String::new(),
            description: msg.content.clone(),
        },
    }
}

/// Container for a newly observed message. Sensitivity is Green when the
/// message carries any attachment or embed, White otherwise.
pub fn container_for(msg: &MessageInfo, channel: &ChannelInfo) -> Container {
    Container {
        name: format!("message {} on channel {}", msg.id, channel.name),
        description: CONTAINER_DESCRIPTION.to_string(),
        sensitivity: if msg.has_evidence() {
            Sensitivity::Green
        } else {
            Sensitivity::White
        },
    }
}

/// Save one artifact per embed and attachment of `msg` under
/// `container_id`; returns the host-assigned ids (attachments, embeds).
pub async fn save_message_artifacts(
    host: &dyn SoarHost,
    container_id: &str,
    msg: &MessageInfo,
) -> Result<(Vec<String>, Vec<String>)> {
    let mut embed_ids = Vec::with_capacity(msg.embeds.len());
    for embed in &msg.embeds {
        let id = host.save_artifact(&embed_artifact(container_id, embed)).await?;
        debug!(artifact_id = %id, message_id = msg.id, "embed artifact saved");
        embed_ids.push(id);
    }

    let mut attachment_ids = Vec::with_capacity(msg.attachments.len());
    for attachment in &msg.attachments {
        let id = host
            .save_artifact(&attachment_artifact(container_id, attachment))
            .await?;
        debug!(artifact_id = %id, message_id = msg.id, "attachment artifact saved");
        attachment_ids.push(id);
    }

    Ok((attachment_ids, embed_ids))
}

fn list_or_sentinel(ids: &[String], sentinel: &str) -> Value {
    if ids.is_empty() {
        Value::String(sentinel.to_string())
    } else {
        Value::from(ids.to_vec())
    }
}

/// Normalized record for a fetched message, with the artifact ids created
/// for its embeds and attachments.
pub fn message_record(
    msg: &MessageInfo,
    channel: &ChannelInfo,
    attachment_ids: &[String],
    embed_ids: &[String],
) -> Value {
    let flags: Value = if msg.flags.is_empty() {
        Value::String(NO_FLAGS.to_string())
    } else {
        Value::from(msg.flags.clone())
    };
    serde_json::json!({
        "message origin": {
            "channel id": msg.channel_id.to_string(),
            "channel name": channel.name,
        },
        "message data": {
            "created at": format_poll_date(msg.created_at),
            "edited at": msg
                .edited_at
                .map(format_poll_date)
                .unwrap_or_else(|| NOT_EDITED.to_string()),
        },
        "author data": {
            "author id": msg.author_id.to_string(),
            "author name": msg.author_name,
        },
        "jump url": msg.jump_url,
        "flags": flags,
        "attachments": list_or_sentinel(attachment_ids, NO_ATTACHMENTS),
        "embeds": list_or_sentinel(embed_ids, NO_EMBEDS),
        "content": msg.content,
    })
}

/// Compact per-message record for `fetch_message_history` results.
pub fn message_summary(msg: &MessageInfo) -> Value {
    serde_json::json!({
        "message_id": msg.id.to_string(),
        "author id": msg.author_id.to_string(),
        "author name": msg.author_name,
        "created at": format_poll_date(msg.created_at),
        "jump url": msg.jump_url,
        "content": msg.content,
    })
}
