//! Batch runners
//!
//! Fan the pipeline and the autopilot sequencer across a collection of
//! workspaces. Both run sequentially: stage runs share one generation
//! endpoint with rate limits, and sequential order keeps per-workspace
//! transforms free of conflicts.

use leadfactory_core::{FactoryConfig, Timestamp, Workspace, WorkspaceStatus};
use leadfactory_llm::StageRunner;
use leadfactory_pipeline::{run_all, RunOptions, WorkspaceSink};

use crate::autopilot::run_autopilot_tick;

/// Run the pipeline over every workspace, skipping stages already done.
///
/// A failed run leaves its workspace FAILED (the orchestrator already
/// recorded the error) and never stops the batch.
pub async fn run_batch(
    workspaces: Vec<Workspace>,
    runner: &dyn StageRunner,
    sink: &mut dyn WorkspaceSink,
) -> Vec<Workspace> {
    let mut out = Vec::with_capacity(workspaces.len());
    for ws in workspaces {
        let name = ws.name.clone();
        let result = run_all(ws, runner, sink, RunOptions { skip_done: true }).await;
        if result.workspace_status == WorkspaceStatus::Failed {
            tracing::warn!(workspace = %name, "batch run failed");
        }
        out.push(result);
    }
    out
}

/// Tick the autopilot for every workspace, returning only those the tick
/// actually changed. Change is detected by comparing values; ticks that
/// skip (inactive, not yet due) return the input unchanged.
pub fn run_autopilot_batch(
    workspaces: Vec<Workspace>,
    config: &FactoryConfig,
    now: Timestamp,
) -> Vec<Workspace> {
    workspaces
        .into_iter()
        .filter_map(|ws| {
            let next = run_autopilot_tick(ws.clone(), config, now);
            if next != ws {
                Some(next)
            } else {
                None
            }
        })
        .collect()
}
