use relaycrew::config::PlanConfig;
use relaycrew::orchestration::{
    CheckpointLoad, CheckpointStore, DeliverableWriter, ProjectState, StateStore, StepId,
};
use relaycrew::shared::logging::{orchestrator_log_path, EventLog};
use serde_json::{json, Value};
use std::fs;

fn plan() -> PlanConfig {
    serde_yaml::from_str(
        "project_name: demo\nworkflow_definition: default.yml\nmission: Ship\naudience: Ops\n",
    )
    .expect("plan")
}

#[test]
fn checkpoint_round_trip_preserves_keys_history_and_completed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let checkpoints = CheckpointStore::for_project(&dir.path().join("state"), "demo");
    let mut store = StateStore::from_state(
        ProjectState::initialize(&plan()),
        checkpoints.clone(),
        DeliverableWriter::for_project(&dir.path().join("deliverables"), "demo"),
    );
    store
        .record_step_result("Writer", "write", Some("draft"), "D1")
        .expect("draft");
    store.mark_completed(&StepId::new(0, 0, "Writer", Some("draft")));
    store
        .record_step_result("Auditor", "audit", None, "looks fine")
        .expect("audit");
    store.mark_completed(&StepId::new(0, 1, "Auditor", None));

    let loaded = checkpoints.load().expect("checkpoint");
    assert_eq!(&loaded, store.state());
    assert_eq!(loaded.history[0].result, "D1");
    assert_eq!(loaded.history[1].agent, "Auditor");
    assert!(loaded.is_completed(&StepId::new(0, 1, "Auditor", None)));
    assert_eq!(loaded.get("mission"), Some(&json!("Ship")));

    let raw: Value =
        serde_json::from_str(&fs::read_to_string(checkpoints.path()).expect("raw")).expect("json");
    assert_eq!(raw["draft"], "D1");
    assert_eq!(raw["completed"], json!(["0:0:Writer:draft", "0:1:Auditor:"]));
}

#[test]
fn corrupt_checkpoint_falls_back_to_fresh_state_with_a_warning() {
    let dir = tempfile::tempdir().expect("tempdir");
    let checkpoints = CheckpointStore::for_project(&dir.path().join("state"), "demo");
    fs::create_dir_all(dir.path().join("state")).expect("state dir");
    fs::write(checkpoints.path(), "{ not json").expect("corrupt");

    assert!(matches!(checkpoints.inspect(), CheckpointLoad::Corrupt { .. }));

    let store = StateStore::open(
        &plan(),
        checkpoints,
        DeliverableWriter::for_project(&dir.path().join("deliverables"), "demo"),
        EventLog::for_workspace(dir.path()),
    );
    assert_eq!(store.state(), &ProjectState::initialize(&plan()));

    let log = fs::read_to_string(orchestrator_log_path(dir.path())).expect("log");
    let event: Value = serde_json::from_str(log.lines().last().expect("line")).expect("event");
    assert_eq!(event["event"], "checkpoint.corrupt");
    assert_eq!(event["level"], "warn");
}

#[test]
fn missing_checkpoint_is_distinguished_from_corrupt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let checkpoints = CheckpointStore::for_project(dir.path(), "demo");
    assert!(matches!(checkpoints.inspect(), CheckpointLoad::Missing));
    assert!(checkpoints.load().is_none());
}

#[test]
fn existing_checkpoint_wins_over_plan_seed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let checkpoints = CheckpointStore::for_project(&dir.path().join("state"), "demo");
    let mut saved = ProjectState::initialize(&plan());
    saved.set("draft", json!("kept")).expect("set");
    checkpoints.persist(&saved).expect("persist");

    let store = StateStore::open(
        &plan(),
        checkpoints,
        DeliverableWriter::for_project(&dir.path().join("deliverables"), "demo"),
        EventLog::disabled(),
    );
    assert_eq!(store.state().get("draft"), Some(&json!("kept")));
}
