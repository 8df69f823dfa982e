//! CRM state
//!
//! Stage enum, append-only activity log and follow-up list. The stage
//! machine is advisory: `set_stage` accepts any transition; the
//! transitions that matter are driven by autopilot ticks and reply
//! application.

use chrono::{Duration, Utc};
use leadfactory_core::{
    new_entity_id, ActivityKind, CrmActivity, CrmData, CrmStage, EntityId, FollowUp, Workspace,
};

/// Lazily initialize the CRM record. Idempotent.
pub fn ensure_crm(mut ws: Workspace) -> Workspace {
    if ws.crm.is_none() {
        ws.crm = Some(CrmData::default());
    }
    ws
}

/// Set the CRM stage directly. Any transition is legal.
pub fn set_stage(ws: Workspace, stage: CrmStage) -> Workspace {
    let mut ws = ensure_crm(ws);
    if let Some(crm) = ws.crm.as_mut() {
        crm.stage = stage;
    }
    ws
}

/// Append an activity entry.
///
/// `last_contact_at` is stamped unconditionally, even for non-contact
/// activity kinds such as notes. Documented quirk of the CRM model, kept
/// as-is.
pub fn add_activity(ws: Workspace, kind: ActivityKind, content: impl Into<String>) -> Workspace {
    let mut ws = ensure_crm(ws);
    let now = Utc::now();
    if let Some(crm) = ws.crm.as_mut() {
        crm.activities.push(CrmActivity {
            activity_id: new_entity_id(),
            kind,
            content: content.into(),
            created_at: now,
        });
        crm.last_contact_at = Some(now);
    }
    ws
}

/// Schedule a follow-up due in `days` days.
pub fn add_follow_up(ws: Workspace, days: i64, note: Option<&str>) -> Workspace {
    let mut ws = ensure_crm(ws);
    if let Some(crm) = ws.crm.as_mut() {
        crm.follow_ups.push(FollowUp {
            follow_up_id: new_entity_id(),
            due_at: Utc::now() + Duration::days(days),
            note: note.map(str::to_string),
            done: false,
        });
    }
    ws
}

/// Mark a follow-up done by id. No-op if the id is unknown or the CRM
/// record does not exist yet.
pub fn complete_follow_up(mut ws: Workspace, follow_up_id: EntityId) -> Workspace {
    if let Some(crm) = ws.crm.as_mut() {
        if let Some(fu) = crm
            .follow_ups
            .iter_mut()
            .find(|f| f.follow_up_id == follow_up_id)
        {
            fu.done = true;
        }
    }
    ws
}
