//! Version-store behavior against the in-memory backend: write serialization
//! under concurrency and the audit-trail invariants.

use std::sync::Arc;

use serde_json::json;

use fhirvault_codec::{IndexRule, IndexedCodec};
use fhirvault_core::{HistoryRecord, VaultError};
use fhirvault_db_memory::MemoryTableStore;
use fhirvault_storage::{DynTableStore, HistoryQuery, VersionStore};

static MEDICATION_RULES: &[IndexRule] = &[IndexRule::scalar("status", "status")];

fn medication_store() -> VersionStore {
    let backend: DynTableStore = Arc::new(MemoryTableStore::new());
    VersionStore::new(backend, Arc::new(IndexedCodec::new("Medication", MEDICATION_RULES)))
}

fn medication(status: &str) -> serde_json::Value {
    json!({"resourceType": "Medication", "status": status})
}

#[tokio::test]
async fn version_sequence_is_contiguous_from_one() {
    let store = medication_store();
    let created = store.create(&medication("active")).await.unwrap();
    assert_eq!(created.version_id, 1);

    for expected in 1..6 {
        let updated = store
            .update(&created.id, &medication("active"), expected)
            .await
            .unwrap();
        assert_eq!(updated.version_id, expected + 1);
    }

    let versions: Vec<i64> = store
        .list_history(&created.id, &HistoryQuery::new())
        .await
        .unwrap()
        .iter()
        .map(HistoryRecord::version_id)
        .collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn concurrent_updates_with_same_expected_version_elect_one_winner() {
    let store = Arc::new(medication_store());
    let created = store.create(&medication("active")).await.unwrap();

    let first = {
        let store = Arc::clone(&store);
        let id = created.id.clone();
        tokio::spawn(async move { store.update(&id, &medication("from-first"), 1).await })
    };
    let second = {
        let store = Arc::clone(&store);
        let id = created.id.clone();
        tokio::spawn(async move { store.update(&id, &medication("from-second"), 1).await })
    };

    let first = first.await.unwrap();
    let second = second.await.unwrap();

    let winner = match (first, second) {
        (Ok(record), Err(loser)) | (Err(loser), Ok(record)) => {
            assert!(loser.is_version_conflict());
            record
        }
        other => panic!("expected exactly one winner, got {other:?}"),
    };
    assert_eq!(winner.version_id, 2);

    // The surviving current record matches the winner's document.
    let current = store.read(&created.id, false).await.unwrap();
    assert_eq!(current.document, winner.document);
    assert_eq!(current.version_id, 2);
}

#[tokio::test]
async fn current_and_latest_history_share_one_transaction_id() {
    let store = medication_store();
    let created = store.create(&medication("active")).await.unwrap();
    store
        .update(&created.id, &medication("inactive"), 1)
        .await
        .unwrap();

    let current = store.read(&created.id, false).await.unwrap();
    let history = store
        .list_history(&created.id, &HistoryQuery::new())
        .await
        .unwrap();

    let latest = history.last().unwrap();
    assert_eq!(latest.version_id(), current.version_id);
    assert_eq!(latest.record.transaction_id, current.transaction_id);
    // Earlier versions keep their own transaction ids.
    assert_ne!(history[0].record.transaction_id, current.transaction_id);
}

#[tokio::test]
async fn writes_to_different_ids_proceed_independently() {
    let store = Arc::new(medication_store());
    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.create(&medication("active")).await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}

#[tokio::test]
async fn create_on_deleted_id_still_conflicts() {
    let store = medication_store();
    let doc = json!({"resourceType": "Medication", "id": "med-1", "status": "active"});
    store.create(&doc).await.unwrap();
    store.soft_delete("med-1", 1).await.unwrap();

    let err = store.create(&doc).await.unwrap_err();
    assert!(matches!(err, VaultError::AlreadyExists { .. }));
}
