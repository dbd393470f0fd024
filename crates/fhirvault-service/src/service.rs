//! The per-resource façade.
//!
//! `ResourceService` binds one codec, one version store, and the shared
//! search translator under a resource-type label. Documents go in, canonical
//! documents or typed errors come out; callers never see records or indexed
//! columns. The transport layer above this (HTTP routes, DTOs, OpenAPI) is
//! generated plumbing and lives elsewhere.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use fhirvault_codec::ResourceCodec;
use fhirvault_core::{HistoryMethod, VaultResult};
use fhirvault_search::{SearchConfig, SearchParams, SearchResult, SearchTranslator};
use fhirvault_storage::{DynTableStore, HistoryQuery, VersionStore};

/// One version of a resource as seen through the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The operation that wrote this version.
    pub method: HistoryMethod,
    /// The document as of this version, metadata overlaid.
    pub document: Value,
}

/// CRUD + search façade for one resource type.
pub struct ResourceService {
    codec: Arc<dyn ResourceCodec>,
    store: VersionStore,
    translator: SearchTranslator,
    tables: DynTableStore,
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("resource_type", &self.codec.resource_type())
            .finish()
    }
}

impl ResourceService {
    /// Binds a codec and backend under the codec's resource-type label.
    #[must_use]
    pub fn new(codec: Arc<dyn ResourceCodec>, tables: DynTableStore, config: SearchConfig) -> Self {
        let store = VersionStore::new(Arc::clone(&tables), Arc::clone(&codec));
        Self {
            codec,
            store,
            translator: SearchTranslator::new(config),
            tables,
        }
    }

    /// The resource type this façade serves.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.codec.resource_type()
    }

    /// Creates a resource; returns the canonical document at version 1.
    pub async fn create(&self, document: &Value) -> VaultResult<Value> {
        let record = self.store.create(document).await?;
        Ok(self.codec.to_document(&record))
    }

    /// Reads the current version of a resource.
    pub async fn read(&self, id: &str) -> VaultResult<Value> {
        let record = self.store.read(id, false).await?;
        Ok(self.codec.to_document(&record))
    }

    /// Updates a resource at an expected version.
    pub async fn update(
        &self,
        id: &str,
        document: &Value,
        expected_version: i64,
    ) -> VaultResult<Value> {
        let record = self.store.update(id, document, expected_version).await?;
        Ok(self.codec.to_document(&record))
    }

    /// Soft-deletes a resource at an expected version.
    pub async fn delete(&self, id: &str, expected_version: i64) -> VaultResult<()> {
        self.store.soft_delete(id, expected_version).await
    }

    /// Searches this resource type's current table.
    pub async fn search(&self, params: &SearchParams) -> VaultResult<SearchResult> {
        self.translator
            .search(self.tables.as_ref(), self.codec.as_ref(), params)
            .await
    }

    /// Lists a resource's versions, ascending, tombstones included.
    pub async fn history(&self, id: &str, query: &HistoryQuery) -> VaultResult<Vec<HistoryEntry>> {
        let entries = self.store.list_history(id, query).await?;
        Ok(entries
            .into_iter()
            .map(|entry| HistoryEntry {
                method: entry.method,
                document: self.codec.to_document(&entry.record),
            })
            .collect())
    }

    /// Reads one specific historical version.
    pub async fn vread(&self, id: &str, version_id: i64) -> VaultResult<Value> {
        let entry = self.store.vread(id, version_id).await?;
        Ok(self.codec.to_document(&entry.record))
    }

    /// The underlying version store, for callers composing lower-level flows.
    #[must_use]
    pub fn store(&self) -> &VersionStore {
        &self.store
    }
}
