//! File round trips for navigation snapshots.

use nav_model::{
    CachedStepResult, Capabilities, ContainerKey, DependencyHash, Descriptor, DescriptorId,
    DestinationInstance, FlowId, InstanceId, NavigationDirection, PendingOutcome, PendingResult,
    ResultChannelId, ResultPayload, StepId,
};
use nav_persistence::{
    ContainerSnapshot, FlowResultsSnapshot, NavigationSnapshot, PersistenceError, decode_snapshot,
    load_snapshot, save_snapshot,
};
use tempfile::tempdir;

fn instance(kind: &str) -> DestinationInstance {
    DestinationInstance::new(
        Descriptor::new(
            DescriptorId::new(kind).unwrap(),
            Capabilities::push_only(),
            serde_json::json!({ "kind": kind }),
        ),
        NavigationDirection::Push,
    )
}

fn sample_snapshot() -> NavigationSnapshot {
    let home = instance("home");
    let detail = instance("detail");
    let backstack: nav_model::Backstack = [home.clone(), detail].into_iter().collect();

    let mut snapshot = NavigationSnapshot::new();
    snapshot.containers.insert(
        ContainerKey::new("main").unwrap(),
        ContainerSnapshot::from_backstack(&backstack),
    );
    snapshot.pending_results.push(PendingResult {
        channel: ResultChannelId::new(home.id().clone(), "pick"),
        outcome: PendingOutcome::Result {
            payload: ResultPayload::new(&"blue".to_string()).unwrap(),
        },
    });

    let mut flow = FlowResultsSnapshot::default();
    let step = StepId::new("name").unwrap();
    flow.results.insert(
        step.clone(),
        CachedStepResult {
            result: ResultPayload::new(&"Ada".to_string()).unwrap(),
            depends_on: DependencyHash::none(),
        },
    );
    flow.defaults_initialized.insert(step);
    snapshot.flows.insert(FlowId::new("signup").unwrap(), flow);
    snapshot
}

#[test]
fn save_then_load_preserves_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("navigation.json");
    let snapshot = sample_snapshot();

    save_snapshot(&snapshot, &path).unwrap();
    let loaded = load_snapshot(&path).unwrap();

    assert_eq!(loaded, snapshot);
    let main = &loaded.containers[&ContainerKey::new("main").unwrap()];
    let kinds: Vec<_> = main
        .to_backstack()
        .iter()
        .map(|instance| instance.descriptor().id().to_string())
        .collect();
    assert_eq!(kinds, vec!["home", "detail"]);
}

#[test]
fn save_overwrites_previous_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("navigation.json");

    save_snapshot(&sample_snapshot(), &path).unwrap();
    save_snapshot(&NavigationSnapshot::new(), &path).unwrap();

    assert!(load_snapshot(&path).unwrap().is_empty());
}

#[test]
fn missing_sections_decode_as_empty() {
    let snapshot = decode_snapshot(br#"{"containers": {"main": {"backstack": []}}}"#).unwrap();
    let main = &snapshot.containers[&ContainerKey::new("main").unwrap()];
    assert!(main.instances.is_empty());
    assert!(snapshot.pending_results.is_empty());
    assert!(snapshot.flows.is_empty());
}

#[test]
fn dangling_backstack_ids_are_skipped() {
    let known = instance("home");
    let mut container = ContainerSnapshot::from_backstack(&[known.clone()].into_iter().collect());
    container
        .backstack
        .insert(0, InstanceId::new("forgotten").unwrap());

    let backstack = container.to_backstack();
    assert_eq!(backstack.len(), 1);
    assert!(backstack.contains(known.id()));
}

#[test]
fn corrupt_file_reports_deserialization() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("navigation.json");
    std::fs::write(&path, b"{ truncated").unwrap();

    let error = load_snapshot(&path).unwrap_err();
    assert!(matches!(error, PersistenceError::Deserialization { .. }));
    assert!(error.suggestion().is_some());
}
