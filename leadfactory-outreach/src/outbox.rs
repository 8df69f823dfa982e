//! Outbox
//!
//! Queued outbound messages with a one-directional status lifecycle and
//! tracking counters. The thread token generated at creation time is the
//! sole correlation key for matching future inbound replies to a send.

use chrono::Utc;
use leadfactory_core::{
    new_entity_id, new_thread_token, Channel, EntityId, MessageMeta, OutboxMessage, Recipient,
    SendLog, SendLogStatus, SendStatus, Timestamp, TrackingStats, Workspace,
};

/// Parameters for creating an outbox message. The message is created in
/// DRAFT status; a thread token is generated when none is supplied.
#[derive(Debug, Clone, Default)]
pub struct NewOutboxMessage {
    pub channel: Option<Channel>,
    pub to: Recipient,
    pub subject: Option<String>,
    pub body: String,
    pub scheduled_at: Option<Timestamp>,
    pub template_key: Option<String>,
    pub step_id: Option<String>,
    pub thread_token: Option<String>,
}

/// Append a new DRAFT message to the outbox. Returns the updated
/// workspace and the new message id.
pub fn create_outbox_message(
    mut ws: Workspace,
    params: NewOutboxMessage,
) -> (Workspace, EntityId) {
    let message_id = new_entity_id();
    let message = OutboxMessage {
        message_id,
        workspace_id: ws.workspace_id,
        channel: params.channel.unwrap_or(Channel::Email),
        to: params.to,
        subject: params.subject,
        body: params.body,
        created_at: Utc::now(),
        scheduled_at: params.scheduled_at,
        sent_at: None,
        status: SendStatus::Draft,
        error: None,
        meta: MessageMeta {
            template_key: params.template_key,
            step_id: params.step_id,
            thread_token: params.thread_token.unwrap_or_else(new_thread_token),
        },
        tracking: None,
    };
    ws.outbox.push(message);
    (ws, message_id)
}

/// Extra fields applied alongside a status transition.
#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub sent_at: Option<Timestamp>,
    pub error: Option<String>,
    pub tracking: Option<TrackingStats>,
}

/// Patch a message's status (and optional fields) by id. No-op if the id
/// is unknown.
pub fn set_message_status(
    mut ws: Workspace,
    message_id: EntityId,
    status: SendStatus,
    patch: MessagePatch,
) -> Workspace {
    if let Some(m) = ws.outbox.iter_mut().find(|m| m.message_id == message_id) {
        m.status = status;
        if patch.sent_at.is_some() {
            m.sent_at = patch.sent_at;
        }
        if patch.error.is_some() {
            m.error = patch.error;
        }
        if patch.tracking.is_some() {
            m.tracking = patch.tracking;
        }
    }
    ws
}

/// Parameters for a send log entry.
#[derive(Debug, Clone)]
pub struct NewSendLog {
    pub message_id: EntityId,
    pub channel: Channel,
    pub status: SendLogStatus,
    pub provider: Option<String>,
    pub provider_message_id: Option<String>,
    pub detail: Option<String>,
}

/// Append a send log entry.
pub fn add_send_log(mut ws: Workspace, log: NewSendLog) -> Workspace {
    ws.send_logs.push(SendLog {
        log_id: new_entity_id(),
        message_id: log.message_id,
        workspace_id: ws.workspace_id,
        channel: log.channel,
        status: log.status,
        provider: log.provider,
        provider_message_id: log.provider_message_id,
        at: Utc::now(),
        detail: log.detail,
    });
    ws
}

/// QUEUED messages whose `scheduled_at` is unset or has passed.
pub fn list_due_messages(ws: &Workspace, now: Timestamp) -> Vec<OutboxMessage> {
    ws.outbox
        .iter()
        .filter(|m| m.status == SendStatus::Queued)
        .filter(|m| m.scheduled_at.map_or(true, |at| at <= now))
        .cloned()
        .collect()
}

/// Apply an observed open event to a message's tracking counters.
///
/// The tracking endpoints themselves are external; this applier exists so
/// a webhook consumer can reflect their effects back into the model.
/// No-op if the message is unknown or carries no tracking stats (only
/// sent emails do).
pub fn record_open(mut ws: Workspace, message_id: EntityId, now: Timestamp) -> Workspace {
    if let Some(tracking) = ws
        .outbox
        .iter_mut()
        .find(|m| m.message_id == message_id)
        .and_then(|m| m.tracking.as_mut())
    {
        tracking.opens += 1;
        tracking.last_event_at = Some(now);
    }
    ws
}

/// Apply an observed click event. Same no-op policy as [`record_open`].
pub fn record_click(mut ws: Workspace, message_id: EntityId, now: Timestamp) -> Workspace {
    if let Some(tracking) = ws
        .outbox
        .iter_mut()
        .find(|m| m.message_id == message_id)
        .and_then(|m| m.tracking.as_mut())
    {
        tracking.clicks += 1;
        tracking.last_event_at = Some(now);
    }
    ws
}
