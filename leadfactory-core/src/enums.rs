//! Enumerations for the LEADFACTORY pipeline, CRM and messaging subsystems

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// PIPELINE STAGES
// ============================================================================

/// One of the six fixed content-generation stages.
///
/// The order is part of the contract: downstream stages consume upstream
/// outputs as prompt context, so re-running a stage invalidates everything
/// strictly after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageName {
    Collector,
    Normalizer,
    PainFinder,
    OfferBuilder,
    Copywriter,
    PrototypeDesigner,
}

impl StageName {
    /// The fixed pipeline order.
    pub const PIPELINE: [StageName; 6] = [
        StageName::Collector,
        StageName::Normalizer,
        StageName::PainFinder,
        StageName::OfferBuilder,
        StageName::Copywriter,
        StageName::PrototypeDesigner,
    ];

    /// Position of this stage within the fixed order.
    pub fn position(&self) -> usize {
        Self::PIPELINE
            .iter()
            .position(|s| s == self)
            .expect("stage is always a member of the fixed pipeline")
    }

    /// Stages strictly downstream of this one, in order.
    pub fn downstream(&self) -> &'static [StageName] {
        &Self::PIPELINE[self.position() + 1..]
    }

    /// Canonical name, used for error tags and wire keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Collector => "Collector",
            StageName::Normalizer => "Normalizer",
            StageName::PainFinder => "PainFinder",
            StageName::OfferBuilder => "OfferBuilder",
            StageName::Copywriter => "Copywriter",
            StageName::PrototypeDesigner => "PrototypeDesigner",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StageName {
    type Err = StageNameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Collector" => Ok(StageName::Collector),
            "Normalizer" => Ok(StageName::Normalizer),
            "PainFinder" => Ok(StageName::PainFinder),
            "OfferBuilder" => Ok(StageName::OfferBuilder),
            "Copywriter" => Ok(StageName::Copywriter),
            "PrototypeDesigner" => Ok(StageName::PrototypeDesigner),
            _ => Err(StageNameParseError(s.to_string())),
        }
    }
}

/// Error when parsing an invalid stage name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNameParseError(pub String);

impl fmt::Display for StageNameParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid stage name: {}", self.0)
    }
}

impl std::error::Error for StageNameParseError {}

/// Run status of a single pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    #[default]
    Waiting,
    Running,
    Done,
    Error,
}

/// Overall workspace status driven by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceStatus {
    /// Intake captured, pipeline not started
    #[default]
    IntakeReceived,
    /// Pipeline in progress
    Running,
    /// Advisory validation flagged missing contact or local signals
    NeedsInput,
    /// All six stages completed
    Done,
    /// A stage failed; pipeline halted
    Failed,
}

/// Verification status reported in an agent log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Ok,
    Warning,
    Fail,
}

// ============================================================================
// ARTIFACTS
// ============================================================================

/// Type discriminator for generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    AuditSystem,
    OfferSystem,
    OutreachSystem,
    CrmSystem,
    SeoMaster,
    SiteSpec,
    SitemapAscii,
    Other,
}

// ============================================================================
// CRM
// ============================================================================

/// CRM pipeline stage.
///
/// The implied progression is `NEW -> CONTACTED -> REPLIED ->
/// {MEETING_BOOKED, PROPOSAL_SENT} -> {WON, LOST}`, but it is advisory:
/// `set_stage` accepts any transition. Autopilot ticks and reply
/// classification drive the transitions that matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrmStage {
    #[default]
    New,
    Contacted,
    Replied,
    MeetingBooked,
    ProposalSent,
    Won,
    Lost,
}

/// Kind of a CRM activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Email,
    Dm,
    Call,
    Note,
    Meeting,
    AutopilotEvent,
}

// ============================================================================
// AUTOPILOT
// ============================================================================

/// Autopilot sequencer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutopilotStatus {
    #[default]
    Off,
    Active,
    Paused,
    /// Terminal: set when the cursor reaches the end of the step list,
    /// or by an explicit stop (reply rules, manual). Resuming requires
    /// re-activation, which resets the cursor.
    Stopped,
}

// ============================================================================
// MESSAGING
// ============================================================================

/// Outbound channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Whatsapp,
    Dm,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Channel::Email => "email",
            Channel::Whatsapp => "whatsapp",
            Channel::Dm => "dm",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle of an outbox message.
///
/// One-directional: `DRAFT -> QUEUED -> SENT | FAILED | CANCELLED`.
/// Retries are not modeled; FAILED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendStatus {
    #[default]
    Draft,
    Queued,
    Sent,
    Failed,
    Cancelled,
}

/// Outcome recorded in a send log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendLogStatus {
    Ok,
    Error,
}

/// How an inbound message was correlated to a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchedBy {
    MessageId,
    Email,
    SubjectToken,
    Manual,
}

// ============================================================================
// REPLY CLASSIFICATION
// ============================================================================

/// Classified intent of an inbound reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyIntent {
    Positive,
    Question,
    Objection,
    NotNow,
    Unsubscribe,
    WrongPerson,
    Bounce,
    OutOfOffice,
    Unknown,
}

impl fmt::Display for ReplyIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReplyIntent::Positive => "positive",
            ReplyIntent::Question => "question",
            ReplyIntent::Objection => "objection",
            ReplyIntent::NotNow => "not_now",
            ReplyIntent::Unsubscribe => "unsubscribe",
            ReplyIntent::WrongPerson => "wrong_person",
            ReplyIntent::Bounce => "bounce",
            ReplyIntent::OutOfOffice => "out_of_office",
            ReplyIntent::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Suggested next action attached to a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    StopAutopilot,
    ScheduleFollowup,
    Reply,
    Ignore,
}

// ============================================================================
// INTAKE
// ============================================================================

/// How the raw prospect data was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntakeMode {
    #[default]
    Card,
    Links,
    Mix,
}
