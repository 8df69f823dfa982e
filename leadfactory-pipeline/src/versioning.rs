//! Version snapshot store
//!
//! Full-workspace point-in-time copies with restore. The snapshot's own
//! `versions` list is emptied at capture time so history never nests
//! recursively; restore replaces the workspace wholesale but splices the
//! current history back in, so history is monotonic across rollbacks.

use chrono::Utc;
use leadfactory_core::{new_entity_id, EntityId, Workspace, WorkspaceVersion};

/// Capture a point-in-time copy of the workspace as a new version entry.
/// An empty note defaults to "Manual snapshot".
pub fn snapshot_workspace(mut ws: Workspace, note: impl Into<String>) -> Workspace {
    let note = note.into();
    let note = if note.is_empty() {
        "Manual snapshot".to_string()
    } else {
        note
    };

    let mut snapshot = ws.clone();
    snapshot.versions = Vec::new();

    ws.versions.push(WorkspaceVersion {
        version_id: new_entity_id(),
        note,
        created_at: Utc::now(),
        snapshot: Box::new(snapshot),
    });
    ws
}

/// Replace the workspace with a snapshot's content, preserving the
/// current (not the snapshotted) version history. Unknown version ids
/// are an idempotent no-op, not an error.
pub fn restore_workspace(ws: Workspace, version_id: EntityId) -> Workspace {
    let Some(version) = ws.versions.iter().find(|v| v.version_id == version_id) else {
        return ws;
    };

    let mut restored = (*version.snapshot).clone();
    restored.versions = ws.versions;
    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{create_artifact, NewArtifact};
    use leadfactory_core::{ArtifactContent, ArtifactType};
    use serde_json::json;

    fn workspace_with_state() -> Workspace {
        let ws = Workspace::new("Boulangerie Petit", "12 rue des Lilas, Lyon")
            .with_phone("+33478000000");
        create_artifact(
            ws,
            NewArtifact {
                artifact_type: ArtifactType::OfferSystem,
                title: "Offre — OfferBuilder".to_string(),
                content: ArtifactContent::Raw(json!({"tiers": []})),
                agent: None,
            },
        )
    }

    #[test]
    fn test_snapshot_appends_a_version_without_nesting() {
        let ws = snapshot_workspace(workspace_with_state(), "before edit");
        assert_eq!(ws.versions.len(), 1);
        assert_eq!(ws.versions[0].note, "before edit");
        assert!(ws.versions[0].snapshot.versions.is_empty());
    }

    #[test]
    fn test_empty_note_defaults() {
        let ws = snapshot_workspace(workspace_with_state(), "");
        assert_eq!(ws.versions[0].note, "Manual snapshot");
    }

    #[test]
    fn test_restore_round_trip_preserves_history() {
        let original = workspace_with_state();
        let ws = snapshot_workspace(original.clone(), "checkpoint");
        let version_id = ws.versions[0].version_id;

        // Mutate after the snapshot
        let mut mutated = ws.clone();
        mutated.name = "Renamed".to_string();
        mutated.artifacts.clear();

        let restored = restore_workspace(mutated, version_id);

        // Every field matches the original except versions, which must
        // still contain the snapshot just taken.
        assert_eq!(restored.name, original.name);
        assert_eq!(restored.artifacts, original.artifacts);
        assert_eq!(restored.versions.len(), 1);
        assert_eq!(restored.versions[0].version_id, version_id);
    }

    #[test]
    fn test_restore_unknown_id_is_a_no_op() {
        let ws = snapshot_workspace(workspace_with_state(), "checkpoint");
        let before = ws.clone();
        let after = restore_workspace(ws, leadfactory_core::new_entity_id());
        assert_eq!(before, after);
    }

    #[test]
    fn test_history_survives_repeated_restores() {
        let ws = snapshot_workspace(workspace_with_state(), "v1");
        let v1 = ws.versions[0].version_id;
        let ws = snapshot_workspace(ws, "v2");

        let restored = restore_workspace(ws, v1);
        assert_eq!(restored.versions.len(), 2);

        let restored_again = restore_workspace(restored, v1);
        assert_eq!(restored_again.versions.len(), 2);
    }
}
