//! Search execution against the in-memory backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use fhirvault_codec::{IndexRule, IndexedCodec, ResourceCodec};
use fhirvault_core::{CurrentRecord, HistoryRecord, VaultResult};
use fhirvault_db_memory::MemoryTableStore;
use fhirvault_search::{SearchConfig, SearchParams, SearchTranslator};
use fhirvault_storage::{DynTableStore, TableStore, TableTransaction, VersionStore};

static MEDICATION_RULES: &[IndexRule] = &[
    IndexRule::scalar("status", "status"),
    IndexRule::coding_system(
        "rxnormCode",
        "code",
        "http://www.nlm.nih.gov/research/umls/rxnorm",
    ),
    IndexRule::reference("manufacturerId", "manufacturer"),
];

fn codec() -> Arc<dyn ResourceCodec> {
    Arc::new(IndexedCodec::new("Medication", MEDICATION_RULES))
}

fn medication(id: &str, status: &str, rxnorm: &str) -> serde_json::Value {
    json!({
        "resourceType": "Medication",
        "id": id,
        "status": status,
        "code": {"coding": [
            {"system": "http://www.nlm.nih.gov/research/umls/rxnorm", "code": rxnorm}
        ]}
    })
}

async fn seeded_store() -> (DynTableStore, VersionStore) {
    let backend: DynTableStore = Arc::new(MemoryTableStore::new());
    let store = VersionStore::new(Arc::clone(&backend), codec());
    for (id, status, rxnorm) in [
        ("med-a", "active", "111"),
        ("med-b", "active", "222"),
        ("med-c", "inactive", "111"),
    ] {
        store.create(&medication(id, status, rxnorm)).await.unwrap();
    }
    (backend, store)
}

#[tokio::test]
async fn filters_and_orders_by_id() {
    let (backend, _) = seeded_store().await;
    let translator = SearchTranslator::new(SearchConfig::default());

    let result = translator
        .search(
            backend.as_ref(),
            codec().as_ref(),
            &SearchParams::new().with_param("status", "active"),
        )
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    let ids: Vec<&str> = result
        .entries
        .iter()
        .map(|doc| doc["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["med-a", "med-b"]);
    // Output is the canonical document shape with overlaid metadata.
    assert_eq!(result.entries[0]["meta"]["versionId"], "1");
    assert!(result.entries[0].get("rxnormCode").is_none());
}

#[tokio::test]
async fn values_or_and_parameters_and() {
    let (backend, _) = seeded_store().await;
    let translator = SearchTranslator::new(SearchConfig::default());

    // status IN (active, inactive) AND rxnormCode = 111
    let result = translator
        .search(
            backend.as_ref(),
            codec().as_ref(),
            &SearchParams::new()
                .with_param("status", "active")
                .with_param("status", "inactive")
                .with_param("rxnormCode", "111"),
        )
        .await
        .unwrap();

    let ids: Vec<&str> = result
        .entries
        .iter()
        .map(|doc| doc["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["med-a", "med-c"]);
}

#[tokio::test]
async fn pagination_is_stable_and_reports_has_more() {
    let (backend, _) = seeded_store().await;
    let translator = SearchTranslator::new(SearchConfig::default());

    let first = translator
        .search(
            backend.as_ref(),
            codec().as_ref(),
            &SearchParams::new().with_count(2),
        )
        .await
        .unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first.total, 3);
    assert!(first.has_more);

    let second = translator
        .search(
            backend.as_ref(),
            codec().as_ref(),
            &SearchParams::new().with_count(2).with_offset(2),
        )
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second.entries[0]["id"], "med-c");
    assert!(!second.has_more);
}

#[tokio::test]
async fn deleted_rows_hidden_unless_requested() {
    let (backend, store) = seeded_store().await;
    store.soft_delete("med-b", 1).await.unwrap();
    let translator = SearchTranslator::new(SearchConfig::default());

    let default = translator
        .search(backend.as_ref(), codec().as_ref(), &SearchParams::new())
        .await
        .unwrap();
    assert_eq!(default.total, 2);

    let inclusive = translator
        .search(
            backend.as_ref(),
            codec().as_ref(),
            &SearchParams::new().with_param("_includeDeleted", "true"),
        )
        .await
        .unwrap();
    assert_eq!(inclusive.total, 3);
}

/// Backend wrapper that counts scans, proving rejected searches never reach
/// storage.
struct ProbeStore {
    inner: MemoryTableStore,
    scans: AtomicUsize,
}

#[async_trait]
impl TableStore for ProbeStore {
    async fn begin(&self, resource_type: &str) -> VaultResult<Box<dyn TableTransaction>> {
        self.inner.begin(resource_type).await
    }

    async fn get_current(
        &self,
        resource_type: &str,
        id: &str,
    ) -> VaultResult<Option<CurrentRecord>> {
        self.inner.get_current(resource_type, id).await
    }

    async fn scan_current(&self, resource_type: &str) -> VaultResult<Vec<CurrentRecord>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan_current(resource_type).await
    }

    async fn list_history(
        &self,
        resource_type: &str,
        id: &str,
    ) -> VaultResult<Vec<HistoryRecord>> {
        self.inner.list_history(resource_type, id).await
    }

    async fn get_version(
        &self,
        resource_type: &str,
        id: &str,
        version_id: i64,
    ) -> VaultResult<Option<HistoryRecord>> {
        self.inner.get_version(resource_type, id, version_id).await
    }

    fn backend_name(&self) -> &'static str {
        "probe"
    }
}

#[tokio::test]
async fn rejected_parameter_touches_no_storage() {
    let probe = ProbeStore {
        inner: MemoryTableStore::new(),
        scans: AtomicUsize::new(0),
    };
    let translator = SearchTranslator::new(SearchConfig::default());

    let err = translator
        .search(
            &probe,
            codec().as_ref(),
            &SearchParams::new()
                .with_param("status", "active")
                .with_param("bogus-param", "x"),
        )
        .await
        .unwrap_err();

    assert!(err.is_unsupported_search_parameter());
    assert_eq!(probe.scans.load(Ordering::SeqCst), 0);
}
