//! Pipeline orchestrator
//!
//! Runs the fixed six-stage sequence against a workspace, persisting
//! intermediate state through the sink after every stage so the process
//! is resumable and observably incremental. Failure of any stage is fatal
//! to the run: later stages are never attempted (fail-fast).

use crate::artifacts::{create_artifact, NewArtifact};
use crate::validation::compute_validation;
use crate::WorkspaceSink;
use chrono::Utc;
use leadfactory_core::{
    ArtifactContent, ArtifactType, FactoryError, FactoryResult, StageError, StageName, StageOutput,
    StageRun, StageStatus, Workspace, WorkspaceStatus,
};
use leadfactory_llm::{StageResult, StageRunner};

/// Options for a pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Skip stages already `done` instead of re-executing them.
    pub skip_done: bool,
}

/// Read-time defaulting pass for persisted records.
///
/// The durable state is a single serializable workspace collection with
/// no schema migrations; fields added since a record was written are
/// defaulted lazily here (via serde defaults) when the record is loaded.
pub fn ensure_workspace_defaults(record: serde_json::Value) -> serde_json::Result<Workspace> {
    serde_json::from_value(record)
}

/// Reset every stage strictly downstream of `from` to `waiting`.
///
/// Conservative by design: downstream stages consumed the re-run stage's
/// output as prompt context and are stale regardless of which fields
/// actually changed. Static ordered-list truncation, not a dependency
/// graph.
pub fn invalidate_from(mut ws: Workspace, from: StageName) -> Workspace {
    for stage in from.downstream() {
        *ws.factory_state.run_mut(*stage) = StageRun::waiting();
    }
    ws
}

/// Execute one stage with the full accumulated workspace as context and
/// merge its output into the workspace's top-level fields.
pub async fn run_one_stage(
    stage: StageName,
    ws: Workspace,
    runner: &dyn StageRunner,
) -> FactoryResult<(Workspace, StageResult)> {
    let result = runner.run_stage(stage, &ws).await?;
    let merged = ws.merge_output(&result.output);
    Ok((merged, result))
}

/// One fixed artifact mapping per stage. The designer's artifact is typed
/// distinctly (`site_spec`) from the audit-style artifacts of the early
/// stages.
fn stage_artifact(stage: StageName, output: &StageOutput) -> NewArtifact {
    let raw = || {
        ArtifactContent::Raw(serde_json::to_value(output).unwrap_or(serde_json::Value::Null))
    };

    match stage {
        StageName::Collector => NewArtifact {
            artifact_type: ArtifactType::AuditSystem,
            title: "Audit (brut) — Collector".to_string(),
            content: raw(),
            agent: Some(stage),
        },
        StageName::Normalizer => NewArtifact {
            artifact_type: ArtifactType::AuditSystem,
            title: "Profil normalisé — Normalizer".to_string(),
            content: raw(),
            agent: Some(stage),
        },
        StageName::PainFinder => NewArtifact {
            artifact_type: ArtifactType::AuditSystem,
            title: "Pains & objections — PainFinder".to_string(),
            content: raw(),
            agent: Some(stage),
        },
        StageName::OfferBuilder => NewArtifact {
            artifact_type: ArtifactType::OfferSystem,
            title: "Offre — OfferBuilder".to_string(),
            content: match &output.offers {
                Some(offers) => ArtifactContent::Offers(offers.clone()),
                None => raw(),
            },
            agent: Some(stage),
        },
        StageName::Copywriter => NewArtifact {
            artifact_type: ArtifactType::OutreachSystem,
            title: "Outreach (emails/DM) — Copywriter".to_string(),
            content: match &output.outreach {
                Some(outreach) => ArtifactContent::Outreach(outreach.clone()),
                None => raw(),
            },
            agent: Some(stage),
        },
        StageName::PrototypeDesigner => NewArtifact {
            artifact_type: ArtifactType::SiteSpec,
            title: "Site Spec v1 — PrototypeDesigner".to_string(),
            content: match &output.prototype {
                Some(proto) => ArtifactContent::SiteSpec(proto.clone()),
                None => raw(),
            },
            agent: Some(stage),
        },
    }
}

/// Run the full pipeline, emitting every intermediate workspace state
/// through the sink.
///
/// Contract:
/// - marks the workspace RUNNING and emits before any stage work;
/// - marks each stage `running` and emits before executing it;
/// - on stage success persists `done` state, creates the stage artifact,
///   recomputes validation (NEEDS_INPUT when contact or local signals are
///   missing) and emits;
/// - on stage failure records `[stage] message` in `errors`, marks the
///   stage `error`, sets FAILED, emits and stops the entire run;
/// - on completion recomputes validation once more, sets DONE and clears
///   `current_agent`.
pub async fn run_all(
    ws: Workspace,
    runner: &dyn StageRunner,
    sink: &mut dyn WorkspaceSink,
    opts: RunOptions,
) -> Workspace {
    let mut ws = ws;
    ws.workspace_status = WorkspaceStatus::Running;
    ws.current_agent = Some(StageName::Collector);
    sink.persist(&ws);

    for stage in StageName::PIPELINE {
        let is_done = ws.factory_state.run(stage).status == StageStatus::Done;
        if opts.skip_done && is_done {
            continue;
        }

        ws.current_agent = Some(stage);
        ws.factory_state.run_mut(stage).status = StageStatus::Running;
        sink.persist(&ws);
        tracing::info!(stage = %stage, workspace = %ws.workspace_id, "stage started");

        match run_one_stage(stage, ws.clone(), runner).await {
            Ok((merged, result)) => {
                ws = merged;
                *ws.factory_state.run_mut(stage) = StageRun {
                    status: StageStatus::Done,
                    output: Some(result.output.clone()),
                    logs: result.logs,
                    timestamp: Some(Utc::now()),
                };
                ws = create_artifact(ws, stage_artifact(stage, &result.output));

                let report = compute_validation(&ws);
                let needs_input =
                    !report.validation.has_contact || !report.validation.local_signals;
                ws.validation = report.validation;
                ws.warnings = report.warnings;
                // Keep running unless blocked, but flag input needs.
                ws.workspace_status = if needs_input {
                    WorkspaceStatus::NeedsInput
                } else {
                    WorkspaceStatus::Running
                };
                sink.persist(&ws);
            }
            Err(err) => {
                tracing::warn!(stage = %stage, workspace = %ws.workspace_id, error = %err, "stage failed, halting pipeline");
                // The "[{stage}]" prefix is the only stage tag in the
                // recorded string; strip wrappers that repeat it.
                let reason = match &err {
                    FactoryError::Stage(StageError::RunnerFailed { reason, .. })
                    | FactoryError::Stage(StageError::MalformedOutput { reason, .. }) => {
                        reason.clone()
                    }
                    FactoryError::Stage(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                ws.errors.push(format!("[{}] {}", stage, reason));
                ws.factory_state.run_mut(stage).status = StageStatus::Error;
                ws.workspace_status = WorkspaceStatus::Failed;
                sink.persist(&ws);
                return ws;
            }
        }
    }

    let report = compute_validation(&ws);
    ws.validation = report.validation;
    ws.warnings = report.warnings;
    ws.workspace_status = WorkspaceStatus::Done;
    ws.current_agent = None;
    sink.persist(&ws);
    tracing::info!(workspace = %ws.workspace_id, "pipeline completed");
    ws
}
