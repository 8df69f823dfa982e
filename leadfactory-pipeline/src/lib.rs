//! LEADFACTORY Pipeline - Workspace Orchestration Engine
//!
//! Sequences the six fixed agent stages with conservative downstream
//! invalidation, owns the artifact and version-snapshot stores, and
//! recomputes advisory validation after every stage.
//!
//! All operations are copy-on-write transforms over the workspace value.
//! Long-running operations push each intermediate workspace state through
//! a caller-supplied [`WorkspaceSink`], which is responsible for durable
//! persistence; the engine holds no workspace cache of its own.

mod artifacts;
mod orchestrator;
mod validation;
mod versioning;

pub use artifacts::{
    create_artifact, get_artifact, remove_artifact, update_artifact_content, upsert_artifact,
    NewArtifact,
};
pub use orchestrator::{
    ensure_workspace_defaults, invalidate_from, run_all, run_one_stage, RunOptions,
};
pub use validation::{compute_validation, scan_banned_words, ValidationReport, BANNED_WORDS};
pub use versioning::{restore_workspace, snapshot_workspace};

use leadfactory_core::Workspace;

/// Persistence sink for workspace state events.
///
/// The orchestrator pushes a sequence of whole-workspace values through
/// this seam; the caller's event loop applies or persists each one
/// (in-memory collection, local storage, remote store). Emission order is
/// the ordering guarantee: stage N's execution never begins before stage
/// N-1's persisted state has been emitted.
pub trait WorkspaceSink {
    fn persist(&mut self, ws: &Workspace);
}

impl<F: FnMut(&Workspace)> WorkspaceSink for F {
    fn persist(&mut self, ws: &Workspace) {
        self(ws)
    }
}
