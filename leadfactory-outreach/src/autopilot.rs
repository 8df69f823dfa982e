//! Autopilot sequencer
//!
//! Drives the outbound step sequence: at most one step executes per tick,
//! producing a QUEUED outbox message, a CRM activity, a cursor advance
//! and a human-verification follow-up. Sending itself belongs to the
//! dispatcher; the sequencer only queues.

use once_cell::sync::Lazy;
use regex::Regex;

use leadfactory_core::{
    ActivityKind, AutopilotData, AutopilotStatus, AutopilotStep, Channel, FactoryConfig,
    Recipient, SendStatus, Timestamp, Workspace,
};

use crate::crm::{add_activity, add_follow_up};
use crate::outbox::{create_outbox_message, set_message_status, MessagePatch, NewOutboxMessage};
use crate::templates::{default_sequence, render_template, template_body};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").unwrap()
});

/// Activate the autopilot with the default sequence, cursor at 0 and the
/// first step due immediately. Re-enabling resets any previous run.
pub fn enable_autopilot(mut ws: Workspace, now: Timestamp) -> Workspace {
    let steps = default_sequence()
        .iter()
        .enumerate()
        .map(|(i, s)| AutopilotStep {
            step_id: format!("step_{i}"),
            delay_days: s.delay_days,
            channel: s.channel,
            template_key: s.template_key.to_string(),
        })
        .collect();
    ws.autopilot = Some(AutopilotData {
        status: AutopilotStatus::Active,
        steps,
        current_step_index: 0,
        next_run_at: Some(now),
    });
    ws
}

/// Suspend an active sequence without losing the cursor.
pub fn pause_autopilot(mut ws: Workspace) -> Workspace {
    if let Some(ap) = ws.autopilot.as_mut() {
        if ap.status == AutopilotStatus::Active {
            ap.status = AutopilotStatus::Paused;
        }
    }
    ws
}

/// Resume a paused sequence where it left off. The only transition that
/// keeps the cursor; [`enable_autopilot`] always restarts from 0.
pub fn resume_autopilot(mut ws: Workspace) -> Workspace {
    if let Some(ap) = ws.autopilot.as_mut() {
        if ap.status == AutopilotStatus::Paused {
            ap.status = AutopilotStatus::Active;
        }
    }
    ws
}

/// Terminally stop the sequence. No-op when autopilot was never enabled.
pub fn stop_autopilot(mut ws: Workspace) -> Workspace {
    if let Some(ap) = ws.autopilot.as_mut() {
        ap.status = AutopilotStatus::Stopped;
    }
    ws
}

/// Best-effort email recipient: confirmed contact first, then a scan of
/// the intake text blocks, then a placeholder that will bounce visibly
/// rather than silently dropping the step.
fn resolve_email(ws: &Workspace) -> String {
    if let Some(email) = ws.contact.as_ref().and_then(|c| c.email.clone()) {
        return email;
    }
    if let Some(intake) = ws.intake.as_ref() {
        for block in &intake.text_blocks {
            if let Some(m) = EMAIL_RE.find(&block.text) {
                return m.as_str().to_string();
            }
        }
    }
    "no-email@found.com".to_string()
}

fn resolve_phone(ws: &Workspace) -> Option<String> {
    ws.contact
        .as_ref()
        .and_then(|c| c.phone_e164.clone())
        .or_else(|| ws.phone.clone())
}

/// Run one sequencer tick.
///
/// Executes at most one step: queues its message, logs a CRM activity,
/// advances the cursor, reschedules `next_run_at` from the delay-day
/// delta to the next step (config gap when the delta is non-positive)
/// and books a verification follow-up. `Dm` steps advance without a
/// message. No-op unless status is ACTIVE and `next_run_at` has passed;
/// a cursor at or past the end of the sequence transitions to STOPPED.
pub fn run_autopilot_tick(ws: Workspace, config: &FactoryConfig, now: Timestamp) -> Workspace {
    let Some(ap) = ws.autopilot.clone() else {
        return ws;
    };
    if ap.status != AutopilotStatus::Active {
        return ws;
    }
    if ap.current_step_index >= ap.steps.len() {
        return stop_autopilot(ws);
    }
    if ap.next_run_at.is_some_and(|at| now < at) {
        return ws;
    }

    let step = ap.steps[ap.current_step_index].clone();
    let body = render_template(
        template_body(&step.template_key).unwrap_or("(Template missing)"),
        &ws.name,
        ws.intake
            .as_ref()
            .map(|i| i.prospect_name.as_str())
            .unwrap_or(&ws.name),
    );

    let mut updated = ws;
    match step.channel {
        Channel::Email => {
            let to_email = resolve_email(&updated);
            let subject = format!("Question pour {}", updated.name);
            let (ws2, message_id) = create_outbox_message(
                updated,
                NewOutboxMessage {
                    channel: Some(Channel::Email),
                    to: Recipient {
                        email: Some(to_email),
                        ..Default::default()
                    },
                    subject: Some(subject),
                    body,
                    scheduled_at: Some(now),
                    template_key: Some(step.template_key.clone()),
                    step_id: Some(step.step_id.clone()),
                    thread_token: None,
                },
            );
            updated = set_message_status(ws2, message_id, SendStatus::Queued, MessagePatch::default());
            updated = add_activity(
                updated,
                ActivityKind::AutopilotEvent,
                format!("Autopilot queued Email: {}", step.template_key),
            );
        }
        Channel::Whatsapp => {
            let to_phone = resolve_phone(&updated);
            let (ws2, message_id) = create_outbox_message(
                updated,
                NewOutboxMessage {
                    channel: Some(Channel::Whatsapp),
                    to: Recipient {
                        phone_e164: to_phone,
                        ..Default::default()
                    },
                    subject: None,
                    body,
                    scheduled_at: Some(now),
                    template_key: Some(step.template_key.clone()),
                    step_id: Some(step.step_id.clone()),
                    thread_token: None,
                },
            );
            updated = set_message_status(ws2, message_id, SendStatus::Queued, MessagePatch::default());
            updated = add_activity(
                updated,
                ActivityKind::AutopilotEvent,
                format!("Autopilot queued WhatsApp: {}", step.template_key),
            );
        }
        // No provider exists for direct messages; the cursor still
        // advances so the sequence cannot wedge on an unsendable step.
        Channel::Dm => {}
    }

    let next_index = ap.current_step_index + 1;
    if let Some(ap) = updated.autopilot.as_mut() {
        if next_index >= ap.steps.len() {
            ap.current_step_index = next_index;
            ap.status = AutopilotStatus::Stopped;
            ap.next_run_at = None;
        } else {
            let delta = ap.steps[next_index].delay_days - step.delay_days;
            let gap = if delta > 0 {
                delta
            } else {
                config.default_step_gap_days
            };
            ap.current_step_index = next_index;
            ap.next_run_at = Some(now + chrono::Duration::days(gap));
        }
    }

    tracing::debug!(
        workspace = %updated.workspace_id,
        step = %step.step_id,
        template = %step.template_key,
        "autopilot step executed"
    );

    add_follow_up(
        updated,
        config.verify_follow_up_days,
        Some(&format!("Verify Autopilot step: {}", step.template_key)),
    )
}
