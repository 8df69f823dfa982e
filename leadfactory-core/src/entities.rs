//! Core entity structures
//!
//! The `Workspace` is the aggregate root: one record per prospect holding
//! all pipeline, artifact, CRM, autopilot, outbox and inbound state.
//! Every subsystem reads and writes through whole-value replacement
//! (copy-on-write), never partial mutation, which is what makes version
//! snapshots faithful point-in-time copies and value comparison a valid
//! "did anything change" check.

use crate::{
    ActivityKind, ArtifactType, AutopilotStatus, Channel, CheckStatus, CrmStage, EntityId,
    IntakeMode, MatchedBy, NextAction, ReplyIntent, SendLogStatus, SendStatus, StageName,
    StageStatus, Timestamp, WorkspaceStatus, new_entity_id,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// STAGE RUN RECORDS
// ============================================================================

/// Side-channel log emitted by an agent stage alongside its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AgentLog {
    pub plan: Vec<String>,
    pub process: Vec<String>,
    pub verification: Vec<VerificationCheck>,
}

/// One verification line in an agent log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationCheck {
    pub check: String,
    pub status: CheckStatus,
}

/// Run record for a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StageRun {
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<StageOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<AgentLog>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl StageRun {
    /// A fresh record with no output.
    pub fn waiting() -> Self {
        Self::default()
    }
}

/// Per-stage run records for the fixed six-stage pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct FactoryState {
    pub collector: StageRun,
    pub normalizer: StageRun,
    pub pain_finder: StageRun,
    pub offer_builder: StageRun,
    pub copywriter: StageRun,
    pub prototype_designer: StageRun,
}

impl FactoryState {
    /// Run record for a stage.
    pub fn run(&self, stage: StageName) -> &StageRun {
        match stage {
            StageName::Collector => &self.collector,
            StageName::Normalizer => &self.normalizer,
            StageName::PainFinder => &self.pain_finder,
            StageName::OfferBuilder => &self.offer_builder,
            StageName::Copywriter => &self.copywriter,
            StageName::PrototypeDesigner => &self.prototype_designer,
        }
    }

    /// Mutable run record for a stage.
    pub fn run_mut(&mut self, stage: StageName) -> &mut StageRun {
        match stage {
            StageName::Collector => &mut self.collector,
            StageName::Normalizer => &mut self.normalizer,
            StageName::PainFinder => &mut self.pain_finder,
            StageName::OfferBuilder => &mut self.offer_builder,
            StageName::Copywriter => &mut self.copywriter,
            StageName::PrototypeDesigner => &mut self.prototype_designer,
        }
    }
}

// ============================================================================
// STAGE OUTPUT (typed partial-workspace merge payload)
// ============================================================================

/// Structured output of one stage, merged into the workspace's top-level
/// fields on success. Every field is optional: a stage only emits the
/// slice it is responsible for. Unrecognized fields are retained in
/// `extra` so a newer prompt revision never loses data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StageOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_selling_points: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_pitch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditSystem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_points: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offers: Option<OfferSystem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outreach: Option<OutreachSystem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prototype: Option<SiteArchitecture>,
    /// Fields the current schema does not know about.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ============================================================================
// STAGE MODULE PAYLOADS
// ============================================================================

/// Audit produced by the early pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSystem {
    pub checks: Vec<String>,
    pub output: AuditOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditOutput {
    pub score: i32,
    pub quick_wins: Vec<String>,
    pub priority: AuditPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditPriority {
    P1,
    P2,
    P3,
}

/// One tier of a commercial offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferTier {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub goal: String,
    pub includes: Vec<String>,
}

/// Tiered offer built by OfferBuilder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferSystem {
    pub tiers: Vec<OfferTier>,
}

/// Outreach persona targeted by the copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    #[serde(rename = "type")]
    pub persona_type: String,
    pub tone: String,
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallScript {
    pub intro: String,
    pub hook: String,
    pub goal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objection {
    pub objection: String,
    pub response: String,
}

/// Outreach package produced by Copywriter: persona, per-channel
/// sequences (opaque, template-shaped), call script and objections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutreachSystem {
    pub persona: Persona,
    pub sequences: Value,
    pub call_script: CallScript,
    pub objections: Vec<Objection>,
}

/// One page of the site prototype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePage {
    pub path: String,
    pub seo: Value,
    pub content_structure: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_html: Option<String>,
}

/// Site prototype produced by PrototypeDesigner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SiteArchitecture {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
    pub sitemap_ascii: String,
    pub pages: Vec<SitePage>,
    #[serde(default)]
    pub exports: Value,
    #[serde(default)]
    pub design_system: Value,
}

// ============================================================================
// ARTIFACTS
// ============================================================================

/// Payload of an artifact: known shapes are fully typed, anything else is
/// carried as a structured-but-unvalidated blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ArtifactContent {
    Audit(AuditSystem),
    Offers(OfferSystem),
    Outreach(OutreachSystem),
    SiteSpec(SiteArchitecture),
    Raw(Value),
}

/// A versioned, independently editable generated document.
///
/// Identity is stable across edits (same id); every content edit
/// increments `version` and `updated_at`. Artifacts are never deleted
/// implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub artifact_id: EntityId,
    pub artifact_type: ArtifactType,
    pub title: String,
    pub content: ArtifactContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<StageName>,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Artifact {
    /// Create a first-version artifact.
    pub fn new(
        artifact_type: ArtifactType,
        title: impl Into<String>,
        content: ArtifactContent,
        agent: Option<StageName>,
    ) -> Self {
        let now = Utc::now();
        Self {
            artifact_id: new_entity_id(),
            artifact_type,
            title: title.into(),
            content,
            agent,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Point-in-time copy of a whole workspace, created by explicit user
/// action. The snapshot's own `versions` list is emptied at capture time
/// so history never nests recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceVersion {
    pub version_id: EntityId,
    pub note: String,
    pub created_at: Timestamp,
    pub snapshot: Box<Workspace>,
}

// ============================================================================
// CRM
// ============================================================================

/// Append-only CRM activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmActivity {
    pub activity_id: EntityId,
    pub kind: ActivityKind,
    pub content: String,
    pub created_at: Timestamp,
}

/// A scheduled follow-up. `done` is the only field that mutates after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub follow_up_id: EntityId,
    pub due_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub done: bool,
}

/// CRM state attached to a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CrmData {
    pub stage: CrmStage,
    pub activities: Vec<CrmActivity>,
    pub follow_ups: Vec<FollowUp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contact_at: Option<Timestamp>,
}

// ============================================================================
// AUTOPILOT
// ============================================================================

/// One step of the outbound messaging sequence. `delay_days` is the
/// offset from sequence activation, not from the previous step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutopilotStep {
    pub step_id: String,
    pub delay_days: i64,
    pub channel: Channel,
    pub template_key: String,
}

/// Autopilot sequencer state.
///
/// `current_step_index` only advances forward and is always <=
/// `steps.len()`; reaching equality transitions status to STOPPED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutopilotData {
    pub status: AutopilotStatus,
    pub steps: Vec<AutopilotStep>,
    pub current_step_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<Timestamp>,
}

// ============================================================================
// MESSAGING
// ============================================================================

/// Channel-specific recipient address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_e164: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

/// Message metadata. `thread_token` is assigned at creation time and is
/// immutable: it is the sole correlation key for matching future inbound
/// replies to this send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    pub thread_token: String,
}

/// Open/click counters for a sent email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrackingStats {
    pub opens: u32,
    pub clicks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event_at: Option<Timestamp>,
}

/// A queued or dispatched outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxMessage {
    pub message_id: EntityId,
    pub workspace_id: EntityId,
    pub channel: Channel,
    pub to: Recipient,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<Timestamp>,
    pub status: SendStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub meta: MessageMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TrackingStats>,
}

/// Audit record of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendLog {
    pub log_id: EntityId,
    pub message_id: EntityId,
    pub workspace_id: EntityId,
    pub channel: Channel,
    pub status: SendLogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    pub at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Per-channel opt-out flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OptOut {
    pub email: bool,
    pub whatsapp: bool,
    pub dm: bool,
}

/// Verified contact info supplied or confirmed by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_e164: Option<String>,
}

// ============================================================================
// INBOUND & REPLIES
// ============================================================================

/// An externally delivered inbound message. Immutable once recorded;
/// the workspace collection is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    pub inbound_id: EntityId,
    pub channel: Channel,
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub text: String,
    pub received_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchedBy>,
}

/// Canned reply suggested by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
}

/// Classification of one inbound message. Produced once per inbound,
/// never revised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyClassification {
    pub intent: ReplyIntent,
    pub confidence: f32,
    pub summary: String,
    pub suggested_next_action: NextAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_reply: Option<ProposedReply>,
}

// ============================================================================
// INTAKE
// ============================================================================

/// A block of pasted text with its origin label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub origin: String,
    pub text: String,
}

/// Raw prospect data captured at workspace creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IntakeData {
    pub mode: IntakeMode,
    pub prospect_name: String,
    pub city: String,
    pub category: String,
    pub images: Vec<String>,
    pub text_blocks: Vec<TextBlock>,
    pub links: Vec<String>,
    pub notes: String,
}

// ============================================================================
// VALIDATION FLAGS
// ============================================================================

/// Derived advisory validation flags, recomputed after every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceValidation {
    pub has_contact: bool,
    pub local_signals: bool,
    pub cta_top_bottom: bool,
    pub no_banned_words: bool,
}

impl Default for WorkspaceValidation {
    fn default() -> Self {
        Self {
            has_contact: false,
            local_signals: false,
            cta_top_bottom: false,
            no_banned_words: true,
        }
    }
}

// ============================================================================
// WORKSPACE (aggregate root)
// ============================================================================

/// The per-prospect aggregate record.
///
/// Optional and collection fields carry serde defaults: the persisted
/// state layout has no schema migrations, so records written before a
/// field existed are completed lazily at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub workspace_id: EntityId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub has_website: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake: Option<IntakeData>,

    // Pitch fields produced by the early stages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_activity: Option<String>,
    #[serde(default)]
    pub key_selling_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_pitch: Option<String>,

    // Pipeline state
    #[serde(default)]
    pub workspace_status: WorkspaceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_agent: Option<StageName>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub validation: WorkspaceValidation,
    #[serde(default)]
    pub factory_state: FactoryState,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub versions: Vec<WorkspaceVersion>,

    // Outreach state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm: Option<CrmData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autopilot: Option<AutopilotData>,
    #[serde(default)]
    pub outbox: Vec<OutboxMessage>,
    #[serde(default)]
    pub send_logs: Vec<SendLog>,
    #[serde(default)]
    pub opt_out: OptOut,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub inbound: Vec<InboundMessage>,
    #[serde(default)]
    pub reply_classifications: BTreeMap<EntityId, ReplyClassification>,

    pub created_at: Timestamp,
}

impl Workspace {
    /// Create a fresh workspace for a named prospect.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            workspace_id: new_entity_id(),
            name: name.into(),
            address: address.into(),
            phone: None,
            has_website: false,
            website_uri: None,
            rating: None,
            intake: None,
            opportunity: None,
            business_activity: None,
            key_selling_points: Vec::new(),
            suggested_pitch: None,
            workspace_status: WorkspaceStatus::IntakeReceived,
            current_agent: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            validation: WorkspaceValidation::default(),
            factory_state: FactoryState::default(),
            artifacts: Vec::new(),
            versions: Vec::new(),
            crm: None,
            autopilot: None,
            outbox: Vec::new(),
            send_logs: Vec::new(),
            opt_out: OptOut::default(),
            contact: None,
            inbound: Vec::new(),
            reply_classifications: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach intake data.
    pub fn with_intake(mut self, intake: IntakeData) -> Self {
        self.intake = Some(intake);
        self
    }

    /// Attach a root phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Merge a stage output into the workspace's top-level fields.
    /// Only fields the stage actually emitted (`Some`) are applied.
    pub fn merge_output(mut self, output: &StageOutput) -> Self {
        if let Some(name) = &output.name {
            self.name = name.clone();
        }
        if let Some(phone) = &output.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(address) = &output.address {
            self.address = address.clone();
        }
        if let Some(opportunity) = &output.opportunity {
            self.opportunity = Some(opportunity.clone());
        }
        if let Some(activity) = &output.business_activity {
            self.business_activity = Some(activity.clone());
        }
        if let Some(points) = &output.key_selling_points {
            self.key_selling_points = points.clone();
        }
        if let Some(pitch) = &output.suggested_pitch {
            self.suggested_pitch = Some(pitch.clone());
        }
        self
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn opt_string() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-zA-Z0-9 àéèêç]{1,24}")
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Emitted fields overwrite, absent fields leave the workspace
        /// value untouched.
        #[test]
        fn prop_merge_output_precedence(
            name in opt_string(),
            phone in opt_string(),
            opportunity in opt_string(),
            pitch in opt_string(),
        ) {
            let ws = Workspace::new("Garage Morel", "4 avenue Jaurès");
            let output = StageOutput {
                name: name.clone(),
                phone: phone.clone(),
                opportunity: opportunity.clone(),
                suggested_pitch: pitch.clone(),
                ..Default::default()
            };
            let merged = ws.clone().merge_output(&output);

            prop_assert_eq!(merged.name, name.unwrap_or(ws.name));
            prop_assert_eq!(merged.phone, phone.or(ws.phone));
            prop_assert_eq!(merged.opportunity, opportunity.or(ws.opportunity));
            prop_assert_eq!(merged.suggested_pitch, pitch.or(ws.suggested_pitch));
            prop_assert_eq!(merged.address, ws.address);
        }

        /// Unknown stage-output fields survive a serialize/deserialize
        /// cycle through the flattened map.
        #[test]
        fn prop_stage_output_round_trips_unknown_fields(
            // "z" prefix keeps generated keys clear of the typed fields.
            key in "z[a-zA-Z0-9]{1,12}",
            value in "[a-zA-Z0-9 ]{0,32}",
        ) {
            let mut output = StageOutput {
                phone: Some("+33612345678".to_string()),
                ..Default::default()
            };
            output.extra.insert(key.clone(), serde_json::json!(value));

            let json = serde_json::to_string(&output).unwrap();
            let back: StageOutput = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back.phone.as_deref(), Some("+33612345678"));
            prop_assert_eq!(back.extra.get(&key), Some(&serde_json::json!(value)));
        }
    }
}
