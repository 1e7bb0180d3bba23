//! End-to-end block lifecycle: BeginBlock, mutations, Commit, and the
//! previous-height view across heights and restarts.

use drive_state::domain::snapshot::TransactionSnapshotStore;
use drive_state::domain::value_objects::{SnapshotConfig, StoreName};
use drive_state::ports::outbound::StoreBackend;
use drive_state::test_utils::{in_memory_coordinator, in_memory_transaction_set};

#[tokio::test]
async fn block_commit_makes_state_durable_for_next_transaction() {
    crate::init_tracing();
    let (mut coordinator, _snapshot_backend) = in_memory_coordinator();

    // Height 1: write one identity.
    coordinator.start().await.unwrap();
    coordinator
        .transaction_mut(StoreName::Identity)
        .put(b"A".to_vec(), b"{\"id\":1}".to_vec());
    coordinator.commit().await.unwrap();

    // Height 2: a fresh transaction scope reads the committed value.
    coordinator.start().await.unwrap();
    assert_eq!(
        coordinator
            .transaction_mut(StoreName::Identity)
            .get(b"A")
            .unwrap(),
        Some(b"{\"id\":1}".to_vec())
    );
    coordinator.commit().await.unwrap();
}

#[tokio::test]
async fn previous_view_tracks_only_last_finalized_height() {
    let (mut coordinator, _snapshot_backend) = in_memory_coordinator();

    // Height 1 writes identity A; height 2 writes identity B.
    coordinator.start().await.unwrap();
    coordinator
        .transaction_mut(StoreName::Identity)
        .put(b"A".to_vec(), b"1".to_vec());
    coordinator.commit().await.unwrap();

    coordinator.start().await.unwrap();
    coordinator
        .transaction_mut(StoreName::Identity)
        .put(b"B".to_vec(), b"2".to_vec());
    coordinator.commit().await.unwrap();

    // The previous view's overlay is exactly height 2's diff. A is no
    // longer staged, but remains visible through the committed store.
    let previous = coordinator.previous_transactions().unwrap();
    let identity = previous.store_transaction(StoreName::Identity);
    assert!(identity.staged().contains_key(&b"B".to_vec()));
    assert!(!identity.staged().contains_key(&b"A".to_vec()));
    assert_eq!(identity.get(b"A").unwrap(), Some(b"1".to_vec()));
    assert_eq!(identity.get(b"B").unwrap(), Some(b"2".to_vec()));
}

#[tokio::test]
async fn aborted_block_leaves_no_trace() {
    let (mut coordinator, snapshot_backend) = in_memory_coordinator();

    coordinator.start().await.unwrap();
    coordinator
        .transaction_mut(StoreName::Document)
        .put(b"doc".to_vec(), b"body".to_vec());
    coordinator
        .transaction_mut(StoreName::DataContract)
        .delete(b"contract".to_vec());
    coordinator.abort().await.unwrap();

    // No snapshot was written and no store was touched.
    assert_eq!(
        snapshot_backend
            .get(&SnapshotConfig::default().key)
            .unwrap(),
        None
    );
    coordinator.start().await.unwrap();
    assert_eq!(
        coordinator
            .transaction_mut(StoreName::Document)
            .get(b"doc")
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn snapshot_survives_process_restart() {
    let (mut coordinator, snapshot_backend) = in_memory_coordinator();

    coordinator.start().await.unwrap();
    coordinator
        .transaction_mut(StoreName::PublicKeyToIdentityId)
        .put(b"pk".to_vec(), b"id".to_vec());
    coordinator
        .transaction_mut(StoreName::Identity)
        .delete(b"revoked".to_vec());
    coordinator.commit().await.unwrap();

    // A restarted process constructs a fresh snapshot store over the same
    // durable backend and rehydrates a fresh set.
    let restarted =
        TransactionSnapshotStore::new(snapshot_backend, SnapshotConfig::default());
    let mut fresh = in_memory_transaction_set();
    restarted.fetch_and_update(&mut fresh).unwrap();

    assert_eq!(
        fresh
            .store_transaction(StoreName::PublicKeyToIdentityId)
            .staged()
            .get(&b"pk".to_vec()),
        Some(&b"id".to_vec())
    );
    assert!(fresh
        .store_transaction(StoreName::Identity)
        .tombstones()
        .contains(&b"revoked".to_vec()));
}

#[tokio::test]
async fn resync_clears_snapshot_record() {
    let (mut coordinator, snapshot_backend) = in_memory_coordinator();

    coordinator.start().await.unwrap();
    coordinator
        .transaction_mut(StoreName::Identity)
        .put(b"A".to_vec(), b"1".to_vec());
    coordinator.commit().await.unwrap();

    let store = TransactionSnapshotStore::new(snapshot_backend, SnapshotConfig::default());
    store.clear().await.unwrap();

    let snapshot = store.fetch().unwrap().unwrap();
    assert!(snapshot.is_empty());
}
