//! Artifact store
//!
//! Generated documents with independent identity and a monotonic
//! per-document version counter. Every mutation returns a new workspace
//! value; a lookup miss returns the input unchanged rather than raising,
//! so UI-driven calls racing with stale ids stay non-fatal.

use chrono::Utc;
use leadfactory_core::{
    Artifact, ArtifactContent, ArtifactType, EntityId, StageName, Workspace,
};

/// Parameters for creating an artifact.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub artifact_type: ArtifactType,
    pub title: String,
    pub content: ArtifactContent,
    pub agent: Option<StageName>,
}

/// Insert or replace an artifact by id.
pub fn upsert_artifact(mut ws: Workspace, artifact: Artifact) -> Workspace {
    match ws
        .artifacts
        .iter_mut()
        .find(|a| a.artifact_id == artifact.artifact_id)
    {
        Some(slot) => *slot = artifact,
        None => ws.artifacts.push(artifact),
    }
    ws
}

/// Create a fresh artifact (`version = 1`) and append it.
pub fn create_artifact(ws: Workspace, params: NewArtifact) -> Workspace {
    let artifact = Artifact::new(
        params.artifact_type,
        params.title,
        params.content,
        params.agent,
    );
    upsert_artifact(ws, artifact)
}

/// Replace an artifact's content, incrementing its version and bumping
/// `updated_at`. No-op if the id is unknown.
pub fn update_artifact_content(
    mut ws: Workspace,
    artifact_id: EntityId,
    content: ArtifactContent,
) -> Workspace {
    if let Some(artifact) = ws
        .artifacts
        .iter_mut()
        .find(|a| a.artifact_id == artifact_id)
    {
        artifact.content = content;
        artifact.version += 1;
        artifact.updated_at = Utc::now();
    }
    ws
}

/// Pure lookup by id.
pub fn get_artifact(ws: &Workspace, artifact_id: EntityId) -> Option<&Artifact> {
    ws.artifacts.iter().find(|a| a.artifact_id == artifact_id)
}

/// Explicitly remove an artifact. Artifacts are never removed implicitly.
pub fn remove_artifact(mut ws: Workspace, artifact_id: EntityId) -> Workspace {
    ws.artifacts.retain(|a| a.artifact_id != artifact_id);
    ws
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadfactory_core::new_entity_id;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> ArtifactContent {
        ArtifactContent::Raw(value)
    }

    fn ws_with_artifact() -> (Workspace, EntityId) {
        let ws = Workspace::new("Garage Morel", "4 avenue Jaurès");
        let ws = create_artifact(
            ws,
            NewArtifact {
                artifact_type: ArtifactType::AuditSystem,
                title: "Audit (brut) — Collector".to_string(),
                content: raw(json!({"score": 42})),
                agent: Some(StageName::Collector),
            },
        );
        let id = ws.artifacts[0].artifact_id;
        (ws, id)
    }

    #[test]
    fn test_create_assigns_fresh_id_and_version_one() {
        let (ws, _) = ws_with_artifact();
        assert_eq!(ws.artifacts.len(), 1);
        assert_eq!(ws.artifacts[0].version, 1);
        assert_eq!(ws.artifacts[0].agent, Some(StageName::Collector));
    }

    #[test]
    fn test_update_increments_version_and_keeps_identity() {
        let (ws, id) = ws_with_artifact();
        let created_at = ws.artifacts[0].created_at;

        let ws = update_artifact_content(ws, id, raw(json!({"score": 55})));
        let a = get_artifact(&ws, id).unwrap();
        assert_eq!(a.version, 2);
        assert_eq!(a.artifact_id, id);
        assert_eq!(a.created_at, created_at);
        assert!(a.updated_at >= created_at);
        assert_eq!(a.content, raw(json!({"score": 55})));
    }

    #[test]
    fn test_update_unknown_id_is_a_no_op() {
        let (ws, _) = ws_with_artifact();
        let before = ws.clone();
        let after = update_artifact_content(ws, new_entity_id(), raw(json!({})));
        assert_eq!(before.artifacts, after.artifacts);
    }

    #[test]
    fn test_remove_is_explicit() {
        let (ws, id) = ws_with_artifact();
        let ws = remove_artifact(ws, id);
        assert!(ws.artifacts.is_empty());
        assert!(get_artifact(&ws, id).is_none());
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let (ws, id) = ws_with_artifact();
        let mut replacement = ws.artifacts[0].clone();
        replacement.title = "Audit v2".to_string();
        let ws = upsert_artifact(ws, replacement);
        assert_eq!(ws.artifacts.len(), 1);
        assert_eq!(get_artifact(&ws, id).unwrap().title, "Audit v2");
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Each successful update increments version by exactly one.
        #[test]
        fn prop_version_monotonicity(updates in 1usize..20) {
            let ws = Workspace::new("Prop", "Nowhere");
            let mut ws = create_artifact(ws, NewArtifact {
                artifact_type: ArtifactType::Other,
                title: "doc".to_string(),
                content: ArtifactContent::Raw(json!(0)),
                agent: None,
            });
            let id = ws.artifacts[0].artifact_id;

            for i in 0..updates {
                ws = update_artifact_content(ws, id, ArtifactContent::Raw(json!(i)));
            }

            let a = get_artifact(&ws, id).unwrap();
            prop_assert_eq!(a.version as usize, updates + 1);
        }
    }
}
