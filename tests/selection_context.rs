//! Organizational context: defaulting policy, persistence and broadcast

use std::sync::Arc;

use org_shell::store::{SELECTED_BRANCH_KEY, SELECTED_COMPANY_KEY};
use org_shell::{
    BranchNotifier, BranchResolution, BranchWatcher, DirectoryError, FileStore, InMemoryDirectory,
    KeyValueStore, LoadPhase, MemoryStore, SelectionChange, SelectionController, SelectionStore,
};

fn acme() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_company("c1", "Acme")
        .with_company("c2", "Globex")
        .with_company("c3", "Initech")
        .with_branches("c1", &[("b1", "Downtown"), ("b2", "Uptown")])
        .with_branches("c2", &[("g1", "Harbor"), ("b1", "Old Town")])
        .with_branches("c3", &[("x1", "Campus")])
}

struct Harness {
    directory: Arc<InMemoryDirectory>,
    store: Arc<MemoryStore>,
    notifier: BranchNotifier,
    controller: SelectionController,
}

fn harness(directory: InMemoryDirectory, store: MemoryStore) -> Harness {
    let directory = Arc::new(directory);
    let store = Arc::new(store);
    let notifier = BranchNotifier::new(8);
    let controller = SelectionController::new(
        directory.clone(),
        SelectionStore::new(store.clone()),
        notifier.clone(),
    );
    Harness {
        directory,
        store,
        notifier,
        controller,
    }
}

#[tokio::test]
async fn test_first_run_defaults_and_persists() {
    let directory = InMemoryDirectory::new()
        .with_company("c1", "Acme")
        .with_branches("c1", &[("b1", "Downtown"), ("b2", "Uptown")]);
    let h = harness(directory, MemoryStore::new());
    let sub = h.notifier.subscribe();

    let selection = h.controller.initialize().await;

    assert_eq!(selection.company_id.as_deref(), Some("c1"));
    assert_eq!(selection.branch_code.as_deref(), Some("b1"));
    assert_eq!(h.store.get(SELECTED_COMPANY_KEY).as_deref(), Some("c1"));
    assert_eq!(h.store.get(SELECTED_BRANCH_KEY).as_deref(), Some("b1"));
    assert_eq!(sub.drain(), 1);
    assert_eq!(h.controller.phase(), LoadPhase::BranchesReady);
}

#[tokio::test]
async fn test_deactivated_branch_falls_back_to_first() {
    let directory = InMemoryDirectory::new()
        .with_company("c1", "Acme")
        .with_branches("c1", &[("b1", "Downtown")]);
    let store = MemoryStore::with_entries([(SELECTED_COMPANY_KEY, "c1"), (SELECTED_BRANCH_KEY, "b9")]);
    let h = harness(directory, store);
    let sub = h.notifier.subscribe();

    let selection = h.controller.initialize().await;

    assert_eq!(selection.branch_code.as_deref(), Some("b1"));
    assert_eq!(h.store.get(SELECTED_BRANCH_KEY).as_deref(), Some("b1"));
    assert_eq!(sub.drain(), 1);
}

#[tokio::test]
async fn test_stored_branch_is_restored_without_writes() {
    let store = MemoryStore::with_entries([(SELECTED_COMPANY_KEY, "c1"), (SELECTED_BRANCH_KEY, "b2")]);
    let h = harness(acme(), store);
    let sub = h.notifier.subscribe();

    let selection = h.controller.initialize().await;

    assert_eq!(selection.company_id.as_deref(), Some("c1"));
    assert_eq!(selection.branch_code.as_deref(), Some("b2"));
    assert_eq!(h.store.write_count(), 0);
    assert_eq!(sub.drain(), 1);
}

#[tokio::test]
async fn test_company_without_branches_clears_and_broadcasts() {
    let directory = InMemoryDirectory::new().with_company("c1", "Acme");
    let store = MemoryStore::with_entries([(SELECTED_BRANCH_KEY, "b1")]);
    let h = harness(directory, store);
    let sub = h.notifier.subscribe();

    let selection = h.controller.initialize().await;

    assert_eq!(selection.branch_code, None);
    assert_eq!(h.store.get(SELECTED_BRANCH_KEY).as_deref(), Some(""));
    assert_eq!(sub.drain(), 1);

    // The branch selector is disabled: nothing to pick
    assert!(h.controller.branches().is_empty());
}

#[tokio::test]
async fn test_reselecting_company_is_a_no_op() {
    let h = harness(acme(), MemoryStore::new());
    h.controller.initialize().await;
    let writes = h.store.write_count();
    let fetches = h.directory.branch_calls();
    let sub = h.notifier.subscribe();

    let change = h.controller.select_company("c1").await;

    assert_eq!(change, SelectionChange::Unchanged);
    assert_eq!(h.store.write_count(), writes);
    assert_eq!(h.directory.branch_calls(), fetches);
    assert_eq!(sub.drain(), 0);
}

#[tokio::test]
async fn test_reselecting_branch_is_a_no_op() {
    let h = harness(acme(), MemoryStore::new());
    h.controller.initialize().await;
    assert_eq!(h.controller.selection().branch_code.as_deref(), Some("b1"));
    let sub = h.notifier.subscribe();

    let writes = h.store.write_count();
    assert_eq!(h.controller.select_branch("b1"), Ok(false));
    assert_eq!(h.controller.select_branch("b1"), Ok(false));

    assert_eq!(h.store.write_count(), writes);
    assert_eq!(sub.drain(), 0);

    assert_eq!(h.controller.select_branch("b2"), Ok(true));
    assert_eq!(h.controller.select_branch("b2"), Ok(false));
    assert_eq!(h.store.write_count(), writes + 1);
    assert_eq!(sub.drain(), 1);
}

#[tokio::test]
async fn test_company_switch_never_restores_previous_branch() {
    let store = MemoryStore::with_entries([(SELECTED_COMPANY_KEY, "c1"), (SELECTED_BRANCH_KEY, "b1")]);
    let h = harness(acme(), store);
    h.controller.initialize().await;
    let sub = h.notifier.subscribe();

    // c2 also lists a "b1", but not first
    let change = h.controller.select_company("c2").await;

    assert_eq!(
        change,
        SelectionChange::Changed(BranchResolution::Defaulted("g1".into()))
    );
    assert_eq!(h.controller.selection().branch_code.as_deref(), Some("g1"));
    assert_eq!(h.store.get(SELECTED_COMPANY_KEY).as_deref(), Some("c2"));
    assert_eq!(h.store.get(SELECTED_BRANCH_KEY).as_deref(), Some("g1"));
    assert_eq!(sub.drain(), 1);
}

#[tokio::test]
async fn test_failed_fetch_after_switch_does_not_keep_previous_branch() {
    // c2 also lists "b1", so a leftover code would be restored on reload
    let directory = InMemoryDirectory::new()
        .with_company("c1", "Acme")
        .with_company("c2", "Globex")
        .with_branches("c1", &[("b1", "Downtown")])
        .with_branches("c2", &[("g1", "Harbor"), ("b1", "Old Town")])
        .fail_branches(
            "c2",
            DirectoryError::Network {
                message: "timeout".into(),
            },
        );
    let h = harness(directory, MemoryStore::new());
    h.controller.initialize().await;
    assert_eq!(h.store.get(SELECTED_BRANCH_KEY).as_deref(), Some("b1"));
    let sub = h.notifier.subscribe();

    let change = h.controller.select_company("c2").await;

    assert_eq!(change, SelectionChange::Changed(BranchResolution::Failed));
    assert_eq!(h.store.get(SELECTED_COMPANY_KEY).as_deref(), Some("c2"));
    assert_eq!(h.store.get(SELECTED_BRANCH_KEY).as_deref(), Some(""));
    assert_eq!(h.controller.scope_reader().branch(), None);
    assert_eq!(sub.drain(), 0);

    // Directory recovered: reload defaults instead of restoring c1's code
    let reloaded = SelectionController::new(
        Arc::new(acme()),
        SelectionStore::new(h.store.clone()),
        BranchNotifier::new(4),
    );
    let selection = reloaded.initialize().await;
    assert_eq!(selection.company_id.as_deref(), Some("c2"));
    assert_eq!(selection.branch_code.as_deref(), Some("g1"));
}

#[tokio::test]
async fn test_abandoned_fetch_cannot_overwrite_newer_selection() {
    let h = harness(acme(), MemoryStore::new());
    h.controller.initialize().await;
    let sub = h.notifier.subscribe();

    let gate = h.directory.hold_branches("c2");
    let abandoned = h.controller.select_company("c2");
    let newer = async {
        tokio::task::yield_now().await;
        let change = h.controller.select_company("c3").await;
        gate.release();
        change
    };
    let (abandoned, newer) = tokio::join!(abandoned, newer);

    assert_eq!(
        abandoned,
        SelectionChange::Changed(BranchResolution::Discarded)
    );
    assert_eq!(
        newer,
        SelectionChange::Changed(BranchResolution::Defaulted("x1".into()))
    );

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.selection.company_id.as_deref(), Some("c3"));
    assert_eq!(snapshot.selection.branch_code.as_deref(), Some("x1"));
    assert_eq!(snapshot.branches.len(), 1);
    assert_eq!(h.store.get(SELECTED_BRANCH_KEY).as_deref(), Some("x1"));
    assert_eq!(sub.drain(), 1);
}

#[tokio::test]
async fn test_watcher_rereads_branch_after_broadcast() {
    let h = harness(acme(), MemoryStore::new());
    let watcher = BranchWatcher::new(h.notifier.subscribe(), h.controller.scope_reader());
    assert_eq!(watcher.current(), None);

    h.controller.initialize().await;
    h.controller.select_branch("b2").unwrap();

    // Two pending signals collapse into one read of the latest value
    assert_eq!(watcher.poll(), Some(Some("b2".to_string())));
    assert_eq!(watcher.poll(), None);
}

#[tokio::test]
async fn test_late_subscriber_gets_no_replay() {
    let h = harness(acme(), MemoryStore::new());
    h.controller.initialize().await;

    let late = h.notifier.subscribe();
    assert!(!late.has_pending());
    assert_eq!(
        h.controller.scope_reader().branch().as_deref(),
        Some("b1")
    );
}

#[tokio::test]
async fn test_selection_survives_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("selection.json");

    {
        let controller = SelectionController::new(
            Arc::new(acme()),
            SelectionStore::new(Arc::new(FileStore::open(path.clone()))),
            BranchNotifier::new(4),
        );
        controller.initialize().await;
        controller.select_company("c2").await;
        controller.select_branch("b1").unwrap();
    }

    let notifier = BranchNotifier::new(4);
    let sub = notifier.subscribe();
    let controller = SelectionController::new(
        Arc::new(acme()),
        SelectionStore::new(Arc::new(FileStore::open(path))),
        notifier.clone(),
    );
    let selection = controller.initialize().await;

    assert_eq!(selection.company_id.as_deref(), Some("c2"));
    assert_eq!(selection.branch_code.as_deref(), Some("b1"));
    assert_eq!(sub.drain(), 1);
}
