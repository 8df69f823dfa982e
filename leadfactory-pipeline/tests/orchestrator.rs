use leadfactory_core::{StageName, StageStatus, WorkspaceStatus};
use leadfactory_pipeline::{ensure_workspace_defaults, invalidate_from, run_all, RunOptions};
use leadfactory_test_utils::{sample_workspace, MockStageRunner, RecordingSink};

#[tokio::test]
async fn test_run_all_completes_all_stages() {
    let runner = MockStageRunner::new();
    let mut sink = RecordingSink::default();

    let ws = run_all(
        sample_workspace(),
        &runner,
        &mut sink,
        RunOptions::default(),
    )
    .await;

    assert_eq!(ws.workspace_status, WorkspaceStatus::Done);
    assert_eq!(ws.current_agent, None);
    for stage in StageName::PIPELINE {
        assert_eq!(ws.factory_state.run(stage).status, StageStatus::Done);
        assert!(ws.factory_state.run(stage).output.is_some());
    }
    assert_eq!(ws.artifacts.len(), 6);
    assert!(ws.errors.is_empty());
}

#[tokio::test]
async fn test_run_all_emits_before_any_stage_work() {
    let runner = MockStageRunner::new();
    let mut sink = RecordingSink::default();

    run_all(
        sample_workspace(),
        &runner,
        &mut sink,
        RunOptions::default(),
    )
    .await;

    let first = &sink.snapshots[0];
    assert_eq!(first.workspace_status, WorkspaceStatus::Running);
    assert_eq!(first.current_agent, Some(StageName::Collector));
    assert_eq!(
        first.factory_state.run(StageName::Collector).status,
        StageStatus::Waiting
    );

    // initial + (running + done) per stage + final
    assert_eq!(sink.snapshots.len(), 1 + 6 * 2 + 1);
}

#[tokio::test]
async fn test_fail_fast_leaves_downstream_waiting() {
    let runner = MockStageRunner::new().failing_at(StageName::PainFinder);
    let mut sink = RecordingSink::default();

    let ws = run_all(
        sample_workspace(),
        &runner,
        &mut sink,
        RunOptions::default(),
    )
    .await;

    assert_eq!(ws.workspace_status, WorkspaceStatus::Failed);
    assert_eq!(
        ws.factory_state.run(StageName::Collector).status,
        StageStatus::Done
    );
    assert_eq!(
        ws.factory_state.run(StageName::Normalizer).status,
        StageStatus::Done
    );
    assert_eq!(
        ws.factory_state.run(StageName::PainFinder).status,
        StageStatus::Error
    );
    for stage in StageName::PainFinder.downstream() {
        assert_eq!(ws.factory_state.run(*stage).status, StageStatus::Waiting);
    }

    assert_eq!(ws.errors.len(), 1);
    assert_eq!(ws.errors[0], "[PainFinder] mock failure");
    assert_eq!(runner.calls().len(), 3);
}

#[tokio::test]
async fn test_skip_done_skips_completed_stages() {
    let runner = MockStageRunner::new();
    let mut sink = RecordingSink::default();

    let ws = run_all(
        sample_workspace(),
        &runner,
        &mut sink,
        RunOptions::default(),
    )
    .await;
    assert_eq!(runner.calls().len(), 6);

    // Invalidate downstream of OfferBuilder: only Copywriter and
    // PrototypeDesigner rerun.
    let ws = invalidate_from(ws, StageName::OfferBuilder);
    run_all(ws, &runner, &mut sink, RunOptions { skip_done: true }).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 8);
    assert_eq!(
        &calls[6..],
        &[StageName::Copywriter, StageName::PrototypeDesigner]
    );
}

#[tokio::test]
async fn test_missing_contact_flags_needs_input_mid_run() {
    // Strip all contact info from every stage output.
    let runner = MockStageRunner::contactless();
    let mut sink = RecordingSink::default();

    let mut ws = sample_workspace();
    ws.phone = None;
    ws.intake = None;
    let ws = run_all(ws, &runner, &mut sink, RunOptions::default()).await;

    // Final status is DONE regardless; the gate shows mid-run.
    assert_eq!(ws.workspace_status, WorkspaceStatus::Done);
    assert!(sink
        .snapshots
        .iter()
        .any(|s| s.workspace_status == WorkspaceStatus::NeedsInput));
    assert!(!ws.validation.has_contact);
    assert!(ws.warnings.iter().any(|w| w.contains("Contact manquant")));
}

#[test]
fn test_invalidate_from_resets_strictly_downstream() {
    let mut ws = sample_workspace();
    for stage in StageName::PIPELINE {
        ws.factory_state.run_mut(stage).status = StageStatus::Done;
    }

    let ws = invalidate_from(ws, StageName::PainFinder);

    assert_eq!(
        ws.factory_state.run(StageName::Collector).status,
        StageStatus::Done
    );
    assert_eq!(
        ws.factory_state.run(StageName::Normalizer).status,
        StageStatus::Done
    );
    assert_eq!(
        ws.factory_state.run(StageName::PainFinder).status,
        StageStatus::Done
    );
    assert_eq!(
        ws.factory_state.run(StageName::OfferBuilder).status,
        StageStatus::Waiting
    );
    assert_eq!(
        ws.factory_state.run(StageName::Copywriter).status,
        StageStatus::Waiting
    );
    assert_eq!(
        ws.factory_state.run(StageName::PrototypeDesigner).status,
        StageStatus::Waiting
    );
}

#[test]
fn test_invalidation_partitions_every_stage() {
    for from in StageName::PIPELINE {
        let mut ws = sample_workspace();
        for stage in StageName::PIPELINE {
            ws.factory_state.run_mut(stage).status = StageStatus::Done;
        }
        let ws = invalidate_from(ws, from);
        for stage in StageName::PIPELINE {
            let expected = if stage.position() > from.position() {
                StageStatus::Waiting
            } else {
                StageStatus::Done
            };
            assert_eq!(ws.factory_state.run(stage).status, expected);
        }
    }
}

#[test]
fn test_invalidate_from_last_stage_is_no_op() {
    let mut ws = sample_workspace();
    for stage in StageName::PIPELINE {
        ws.factory_state.run_mut(stage).status = StageStatus::Done;
    }
    let before = ws.clone();
    let after = invalidate_from(ws, StageName::PrototypeDesigner);
    assert_eq!(before, after);
}

#[test]
fn test_ensure_workspace_defaults_fills_missing_fields() {
    let record = serde_json::json!({
        "workspaceId": uuid::Uuid::now_v7(),
        "name": "Legacy Record",
        "createdAt": chrono::Utc::now(),
    });
    let ws = ensure_workspace_defaults(record).unwrap();
    assert_eq!(ws.workspace_status, WorkspaceStatus::IntakeReceived);
    assert!(ws.outbox.is_empty());
    assert!(ws.versions.is_empty());
    assert_eq!(
        ws.factory_state.run(StageName::Collector).status,
        StageStatus::Waiting
    );
}
