//! LEADFACTORY Outreach - CRM, Autopilot, Outbox and Replies
//!
//! Converts time-delayed messaging steps and inbound replies into CRM
//! transitions:
//! - CRM stage, activity log and follow-ups
//! - Autopilot sequencer (scheduled step sequence, one step per tick)
//! - Outbox with a one-directional status lifecycle and dispatch with
//!   tracking injection
//! - Reply classification and deterministic state application
//! - Batch runners fanning the pipeline and the sequencer across a
//!   collection of workspaces, sequentially
//!
//! Like the pipeline engine, every operation here is a copy-on-write
//! transform: it takes a workspace value and returns a new one, leaving
//! persistence to the caller.

mod autopilot;
mod batch;
mod crm;
mod dispatch;
mod outbox;
mod reply;
mod sender;
mod templates;

pub use autopilot::{
    enable_autopilot, pause_autopilot, resume_autopilot, run_autopilot_tick, stop_autopilot,
};
pub use batch::{run_autopilot_batch, run_batch};
pub use crm::{add_activity, add_follow_up, complete_follow_up, ensure_crm, set_stage};
pub use dispatch::dispatch_due_messages;
pub use outbox::{
    add_send_log, create_outbox_message, list_due_messages, record_click, record_open,
    set_message_status, MessagePatch, NewOutboxMessage, NewSendLog,
};
pub use reply::{apply_reply, classify_heuristic, HeuristicClassifier, ReplyClassifier, ReplyInput};
pub use sender::{EmailPayload, HttpSender, MessageSender, SendReceipt, WhatsAppPayload};
pub use templates::{default_sequence, render_template, template_body, SequenceTemplate};
