//! The versioned-resource store.
//!
//! One `VersionStore` serves one resource type, generic over the codec value
//! it was constructed with. Every mutation runs inside exactly one backend
//! transaction: the history row is written first, then the current row, and
//! the optimistic version check happens inside the same transaction — a
//! losing concurrent writer gets `VersionConflict` and must re-read and
//! retry. The engine never retries on its own.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use fhirvault_codec::ResourceCodec;
use fhirvault_core::{
    CurrentRecord, HistoryMethod, HistoryRecord, TransactionId, VaultError, VaultResult,
    generate_id, now_utc,
};

use crate::traits::DynTableStore;

/// Pagination parameters for a history listing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of entries to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Number of entries to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl HistoryQuery {
    /// Creates an unpaginated history query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the count parameter.
    #[must_use]
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the offset parameter.
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Versioned persistence for one resource type.
pub struct VersionStore {
    tables: DynTableStore,
    codec: Arc<dyn ResourceCodec>,
}

impl VersionStore {
    /// Creates a store over an injected backend and codec value.
    #[must_use]
    pub fn new(tables: DynTableStore, codec: Arc<dyn ResourceCodec>) -> Self {
        Self { tables, codec }
    }

    /// The resource type this store serves.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.codec.resource_type()
    }

    /// Validates the document boundary: a JSON object whose `resourceType`
    /// matches this store, and whose embedded id (if any) matches `id`.
    fn check_document(&self, document: &Value, id: Option<&str>) -> VaultResult<()> {
        let Some(obj) = document.as_object() else {
            return Err(VaultError::invalid_resource("document must be a JSON object"));
        };
        match obj.get("resourceType").and_then(Value::as_str) {
            Some(label) if label == self.codec.resource_type() => {}
            Some(label) => {
                return Err(VaultError::invalid_resource(format!(
                    "resourceType '{label}' does not match '{}'",
                    self.codec.resource_type()
                )));
            }
            None => {
                return Err(VaultError::invalid_resource("missing resourceType field"));
            }
        }
        if let (Some(expected), Some(embedded)) = (id, obj.get("id").and_then(Value::as_str))
            && embedded != expected
        {
            return Err(VaultError::invalid_resource(format!(
                "document id '{embedded}' does not match '{expected}'"
            )));
        }
        Ok(())
    }

    /// Creates the first version of a resource.
    ///
    /// Assigns a fresh logical id when the document carries none. Fails with
    /// `AlreadyExists` when the supplied id already has a current record —
    /// soft-deleted included, so a deleted id is never recycled at version 1.
    pub async fn create(&self, document: &Value) -> VaultResult<CurrentRecord> {
        self.check_document(document, None)?;

        let mut record = self.codec.from_document(document, TransactionId::new());
        if record.id.is_empty() {
            record.id = generate_id();
        }
        record.version_id = 1;

        let mut tx = self.tables.begin(self.codec.resource_type()).await?;
        if tx.read_current(&record.id).await?.is_some() {
            tx.rollback().await?;
            return Err(VaultError::already_exists(
                self.codec.resource_type(),
                record.id,
            ));
        }
        tx.append_history(HistoryRecord::new(record.clone(), HistoryMethod::Create))
            .await?;
        tx.insert_current(record.clone()).await?;
        tx.commit().await?;

        debug!(
            resource_type = %self.codec.resource_type(),
            id = %record.id,
            "created resource"
        );
        Ok(record)
    }

    /// Reads the current version of a resource.
    ///
    /// Soft-deleted resources surface as `NotFound` unless `include_deleted`
    /// is set.
    pub async fn read(&self, id: &str, include_deleted: bool) -> VaultResult<CurrentRecord> {
        let record = self
            .tables
            .get_current(self.codec.resource_type(), id)
            .await?
            .ok_or_else(|| VaultError::not_found(self.codec.resource_type(), id))?;
        if record.is_deleted() && !include_deleted {
            return Err(VaultError::not_found(self.codec.resource_type(), id));
        }
        Ok(record)
    }

    /// Writes a new version of a resource.
    ///
    /// The version check runs against the row re-read inside the transaction;
    /// a mismatch aborts with `VersionConflict`. Updating a soft-deleted
    /// resource at its tombstone version clears `deleted_at`.
    pub async fn update(
        &self,
        id: &str,
        document: &Value,
        expected_version: i64,
    ) -> VaultResult<CurrentRecord> {
        self.check_document(document, Some(id))?;

        let mut tx = self.tables.begin(self.codec.resource_type()).await?;
        let current = match tx.read_current(id).await? {
            Some(current) => current,
            None => {
                tx.rollback().await?;
                return Err(VaultError::not_found(self.codec.resource_type(), id));
            }
        };
        if current.version_id != expected_version {
            tx.rollback().await?;
            warn!(
                resource_type = %self.codec.resource_type(),
                id = %id,
                expected = expected_version,
                actual = current.version_id,
                "update lost version race"
            );
            return Err(VaultError::version_conflict(
                self.codec.resource_type(),
                id,
                expected_version,
                current.version_id,
            ));
        }

        let mut record = self.codec.from_document(document, TransactionId::new());
        record.id = id.to_string();
        record.version_id = expected_version + 1;
        record.deleted_at = None;

        tx.append_history(HistoryRecord::new(record.clone(), HistoryMethod::Update))
            .await?;
        tx.put_current(record.clone()).await?;
        tx.commit().await?;

        debug!(
            resource_type = %self.codec.resource_type(),
            id = %id,
            version = record.version_id,
            "updated resource"
        );
        Ok(record)
    }

    /// Soft-deletes a resource.
    ///
    /// Writes a tombstone history row and stamps `deleted_at` on the current
    /// row inside one transaction. The row itself is never removed; deletion
    /// is a state.
    pub async fn soft_delete(&self, id: &str, expected_version: i64) -> VaultResult<()> {
        let mut tx = self.tables.begin(self.codec.resource_type()).await?;
        let current = match tx.read_current(id).await? {
            Some(current) => current,
            None => {
                tx.rollback().await?;
                return Err(VaultError::not_found(self.codec.resource_type(), id));
            }
        };
        if current.version_id != expected_version {
            tx.rollback().await?;
            warn!(
                resource_type = %self.codec.resource_type(),
                id = %id,
                expected = expected_version,
                actual = current.version_id,
                "delete lost version race"
            );
            return Err(VaultError::version_conflict(
                self.codec.resource_type(),
                id,
                expected_version,
                current.version_id,
            ));
        }

        let now = now_utc();
        let mut record = current;
        record.version_id = expected_version + 1;
        record.transaction_id = TransactionId::new();
        record.last_updated = now;
        record.deleted_at = Some(now);

        tx.append_history(HistoryRecord::new(record.clone(), HistoryMethod::Delete))
            .await?;
        tx.put_current(record).await?;
        tx.commit().await?;

        debug!(
            resource_type = %self.codec.resource_type(),
            id = %id,
            "soft-deleted resource"
        );
        Ok(())
    }

    /// Reads one specific historical version.
    pub async fn vread(&self, id: &str, version_id: i64) -> VaultResult<HistoryRecord> {
        self.tables
            .get_version(self.codec.resource_type(), id, version_id)
            .await?
            .ok_or_else(|| VaultError::not_found(self.codec.resource_type(), id))
    }

    /// Lists a resource's history, ascending by version.
    pub async fn list_history(
        &self,
        id: &str,
        query: &HistoryQuery,
    ) -> VaultResult<Vec<HistoryRecord>> {
        let mut entries = self
            .tables
            .list_history(self.codec.resource_type(), id)
            .await?;
        entries.sort_by_key(HistoryRecord::version_id);

        let offset = query.offset.unwrap_or(0) as usize;
        let entries = entries.into_iter().skip(offset);
        Ok(match query.count {
            Some(count) => entries.take(count as usize).collect(),
            None => entries.collect(),
        })
    }

    /// The codec value this store was constructed with.
    #[must_use]
    pub fn codec(&self) -> &Arc<dyn ResourceCodec> {
        &self.codec
    }
}
