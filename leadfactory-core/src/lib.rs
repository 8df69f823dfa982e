//! LEADFACTORY Core - Entity Types
//!
//! Pure data structures with no behavior beyond constructors and small
//! accessors. All other crates depend on this. Business logic lives in
//! `leadfactory-pipeline` and `leadfactory-outreach`.

mod config;
mod entities;
mod enums;
mod error;
mod identity;

pub use config::FactoryConfig;
pub use entities::{
    AgentLog, Artifact, ArtifactContent, AuditOutput, AuditPriority, AuditSystem, AutopilotData,
    AutopilotStep, CallScript, Contact, CrmActivity, CrmData, FactoryState, FollowUp, IntakeData,
    InboundMessage, MessageMeta, Objection, OfferSystem, OfferTier, OptOut, OutboxMessage,
    OutreachSystem, Persona, ProposedReply, Recipient, ReplyClassification, SendLog,
    SiteArchitecture, SitePage, StageOutput, StageRun, TextBlock, TrackingStats,
    VerificationCheck, Workspace, WorkspaceValidation, WorkspaceVersion,
};
pub use enums::{
    ActivityKind, ArtifactType, AutopilotStatus, Channel, CheckStatus, CrmStage, IntakeMode,
    MatchedBy, NextAction, ReplyIntent, SendLogStatus, SendStatus, StageName, StageNameParseError,
    StageStatus, WorkspaceStatus,
};
pub use error::{ConfigError, FactoryError, FactoryResult, SendError, StageError};
pub use identity::{EntityId, Timestamp, new_entity_id, new_thread_token};
