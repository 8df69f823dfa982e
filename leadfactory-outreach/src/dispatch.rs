//! Dispatch
//!
//! Drains due QUEUED messages through a [`MessageSender`]. Messages are
//! processed sequentially in queue order; a failure on one message marks
//! it FAILED and moves on, it never aborts the batch. Emails get the
//! tracking treatment on the way out: click-redirect rewrite, open pixel,
//! unsubscribe footer and the thread token in subject and hidden span.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use leadfactory_core::{
    Channel, FactoryConfig, OutboxMessage, SendError, SendLogStatus, SendStatus, Timestamp,
    TrackingStats, Workspace,
};

use crate::outbox::{add_send_log, list_due_messages, set_message_status, MessagePatch, NewSendLog};
use crate::sender::{EmailPayload, MessageSender, WhatsAppPayload};

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(https?://[^\s<"']+)"#).unwrap());

/// Render the outbound HTML for an email: text to HTML, absolute URLs
/// rewritten through the click redirect, open pixel, unsubscribe footer
/// and the thread token hidden in a zero-size span.
fn build_email_html(ws: &Workspace, m: &OutboxMessage, base: &str) -> String {
    let tracking_id = m.message_id;

    let unsub_url = format!("{}/unsubscribe/{}/email", base, ws.workspace_id);
    let footer = format!(
        "<div style=\"margin-top: 40px; padding-top: 20px; border-top: 1px solid #eee; font-size: 11px; color: #888;\">\
         <p>Vous recevez cet email car nous avons identifié des opportunités pour {}.</p>\
         <p><a href=\"{}\" style=\"color: #888;\">Se désinscrire</a></p></div>",
        ws.name, unsub_url
    );

    let html_body = m.body.replace('\n', "<br/>");
    let html_body = URL_RE.replace_all(&html_body, |caps: &regex::Captures| {
        format!(
            "{}/t/click/{}?url={}",
            base,
            tracking_id,
            urlencoding::encode(&caps[1])
        )
    });

    let pixel = format!(
        "<img src=\"{}/t/open/{}\" width=\"1\" height=\"1\" alt=\"\" style=\"display:none;\" />",
        base, tracking_id
    );
    let hidden_token = format!(
        "<span style=\"display:none; color:transparent; font-size:0;\">ref:{}</span>",
        m.meta.thread_token
    );

    format!(
        "<div style=\"font-family: sans-serif; color: #333;\">{}</div>{}{}{}",
        html_body, footer, pixel, hidden_token
    )
}

/// Thread token appended to the subject for reliable reply matching; the
/// hidden body span is the backup when a client rewrites the subject.
fn build_email_subject(m: &OutboxMessage) -> String {
    let subject = m.subject.as_deref().unwrap_or("(no subject)");
    format!("{} [LF:{}]", subject, m.meta.thread_token)
}

async fn send_one(
    ws: &Workspace,
    m: &OutboxMessage,
    sender: &dyn MessageSender,
    config: &FactoryConfig,
) -> SendOutcome {
    match m.channel {
        Channel::Email => {
            let Some(to) = m.to.email.clone() else {
                return SendOutcome::Failed(
                    SendError::MissingRecipient {
                        channel: Channel::Email,
                    }
                    .to_string(),
                );
            };
            let payload = EmailPayload {
                to,
                subject: build_email_subject(m),
                body: m.body.clone(),
                html: Some(build_email_html(ws, m, &config.sender_base_url)),
            };
            match sender.send_email(payload).await {
                Ok(receipt) => SendOutcome::Sent {
                    provider: receipt.provider,
                    provider_message_id: receipt.provider_message_id,
                    tracking: Some(TrackingStats::default()),
                },
                Err(e) => SendOutcome::Failed(e.to_string()),
            }
        }
        Channel::Whatsapp => {
            let Some(to_e164) = m.to.phone_e164.clone() else {
                return SendOutcome::Failed(
                    SendError::MissingRecipient {
                        channel: Channel::Whatsapp,
                    }
                    .to_string(),
                );
            };
            let payload = WhatsAppPayload {
                to_e164,
                body: m.body.clone(),
            };
            match sender.send_whatsapp(payload).await {
                Ok(receipt) => SendOutcome::Sent {
                    provider: receipt.provider,
                    provider_message_id: receipt.provider_message_id,
                    tracking: None,
                },
                Err(e) => SendOutcome::Failed(e.to_string()),
            }
        }
        Channel::Dm => SendOutcome::NotImplemented,
    }
}

enum SendOutcome {
    Sent {
        provider: Option<String>,
        provider_message_id: Option<String>,
        tracking: Option<TrackingStats>,
    },
    Failed(String),
    NotImplemented,
}

/// Dispatch every due message through the sender.
///
/// Opt-out is checked per channel at send time and short-circuits to
/// CANCELLED without a send log. SENT emails get fresh tracking stats;
/// WhatsApp sends do not. Dm messages fail immediately with no log
/// entry, matching the absence of any provider.
pub async fn dispatch_due_messages(
    ws: Workspace,
    sender: &dyn MessageSender,
    config: &FactoryConfig,
    now: Timestamp,
) -> Workspace {
    let due = list_due_messages(&ws, now);
    let mut ws = ws;

    for m in due {
        if m.channel == Channel::Email && ws.opt_out.email {
            ws = set_message_status(
                ws,
                m.message_id,
                SendStatus::Cancelled,
                MessagePatch {
                    error: Some("Opt-out email".to_string()),
                    ..Default::default()
                },
            );
            continue;
        }
        if m.channel == Channel::Whatsapp && ws.opt_out.whatsapp {
            ws = set_message_status(
                ws,
                m.message_id,
                SendStatus::Cancelled,
                MessagePatch {
                    error: Some("Opt-out whatsapp".to_string()),
                    ..Default::default()
                },
            );
            continue;
        }

        match send_one(&ws, &m, sender, config).await {
            SendOutcome::Sent {
                provider,
                provider_message_id,
                tracking,
            } => {
                tracing::info!(
                    workspace = %ws.workspace_id,
                    message = %m.message_id,
                    channel = %m.channel,
                    "message sent"
                );
                ws = set_message_status(
                    ws,
                    m.message_id,
                    SendStatus::Sent,
                    MessagePatch {
                        sent_at: Some(Utc::now()),
                        tracking,
                        ..Default::default()
                    },
                );
                ws = add_send_log(
                    ws,
                    NewSendLog {
                        message_id: m.message_id,
                        channel: m.channel,
                        status: SendLogStatus::Ok,
                        provider,
                        provider_message_id,
                        detail: None,
                    },
                );
            }
            SendOutcome::Failed(error) => {
                tracing::warn!(
                    workspace = %ws.workspace_id,
                    message = %m.message_id,
                    channel = %m.channel,
                    error = %error,
                    "message send failed"
                );
                ws = set_message_status(
                    ws,
                    m.message_id,
                    SendStatus::Failed,
                    MessagePatch {
                        error: Some(error.clone()),
                        ..Default::default()
                    },
                );
                ws = add_send_log(
                    ws,
                    NewSendLog {
                        message_id: m.message_id,
                        channel: m.channel,
                        status: SendLogStatus::Error,
                        provider: Some("unknown".to_string()),
                        provider_message_id: None,
                        detail: Some(error),
                    },
                );
            }
            SendOutcome::NotImplemented => {
                ws = set_message_status(
                    ws,
                    m.message_id,
                    SendStatus::Failed,
                    MessagePatch {
                        error: Some("DM provider not implemented".to_string()),
                        ..Default::default()
                    },
                );
            }
        }
    }

    ws
}
