//! Record shapes shared by every resource type.
//!
//! Each resource type is backed by a current table (one mutable row per
//! logical id) and an append-only history table. Both share the same payload
//! shape: an opaque JSON document plus flat indexed scalars extracted from it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::id::TransactionId;

/// Flat map of indexed column name → scalar value.
///
/// Indexed fields are a pure function of the document; they exist for fast
/// filtering and are never authoritative. Replaying the codec over the
/// document reproduces them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexedFields(BTreeMap<String, String>);

impl IndexedFields {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    /// Sets a column value when present; absent optional data leaves the
    /// column unset.
    pub fn set_opt(&mut self, column: impl Into<String>, value: Option<String>) {
        if let Some(value) = value {
            self.0.insert(column.into(), value);
        }
    }

    /// Returns the value stored for a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Returns `true` when no columns are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of columns set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The latest observed version of one logical resource.
///
/// Exactly one current record exists per logical id; it is overwritten in
/// place on every update and never physically removed — deletion is a state
/// (`deleted_at`), not a row removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentRecord {
    /// Stable identifier across all versions.
    pub id: String,
    /// Monotonically increasing version, starting at 1 per logical id.
    /// Assigned by the version store, never by a codec.
    pub version_id: i64,
    /// When this version was written.
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    /// The write transaction that produced this version.
    pub transaction_id: TransactionId,
    /// Canonical resource body, stored without `id`/`meta` — those are
    /// overlaid on the way out.
    pub document: Value,
    /// Set when the resource is soft-deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
    /// Scalar columns extracted from `document` for search.
    #[serde(default, skip_serializing_if = "IndexedFields::is_empty")]
    pub indexed: IndexedFields,
}

impl CurrentRecord {
    /// Returns `true` when the resource is soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// The operation that wrote a history row.
///
/// `Delete` marks the tombstone version explicitly so history stays
/// self-describing without consulting the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMethod {
    /// First version of a logical id.
    Create,
    /// A subsequent version.
    Update,
    /// The tombstone version.
    Delete,
}

impl HistoryMethod {
    /// Returns `true` for tombstone rows.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

impl std::fmt::Display for HistoryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// One row of a resource's append-only audit trail.
///
/// Carries the full record payload as written, plus a surrogate key distinct
/// from the logical id. History rows are never updated or deleted by the
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Surrogate key of this history row.
    pub entry_id: Uuid,
    /// The operation that produced this version.
    pub method: HistoryMethod,
    /// The record payload exactly as committed.
    pub record: CurrentRecord,
}

impl HistoryRecord {
    /// Creates a history row for a record about to be committed.
    #[must_use]
    pub fn new(record: CurrentRecord, method: HistoryMethod) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            method,
            record,
        }
    }

    /// Version captured by this row.
    #[must_use]
    pub fn version_id(&self) -> i64 {
        self.record.version_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now_utc;
    use serde_json::json;

    fn sample_record() -> CurrentRecord {
        let mut indexed = IndexedFields::new();
        indexed.set("status", "active");
        CurrentRecord {
            id: "med-1".to_string(),
            version_id: 1,
            last_updated: now_utc(),
            transaction_id: TransactionId::new(),
            document: json!({"resourceType": "Medication", "status": "active"}),
            deleted_at: None,
            indexed,
        }
    }

    #[test]
    fn test_indexed_fields_set_and_get() {
        let mut fields = IndexedFields::new();
        assert!(fields.is_empty());

        fields.set("status", "active");
        fields.set_opt("rxnormCode", Some("12345".to_string()));
        fields.set_opt("manufacturerId", None);

        assert_eq!(fields.get("status"), Some("active"));
        assert_eq!(fields.get("rxnormCode"), Some("12345"));
        assert_eq!(fields.get("manufacturerId"), None);
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_indexed_fields_iterates_in_column_order() {
        let mut fields = IndexedFields::new();
        fields.set("status", "active");
        fields.set("code", "12345");
        let columns: Vec<&str> = fields.iter().map(|(k, _)| k).collect();
        assert_eq!(columns, vec!["code", "status"]);
    }

    #[test]
    fn test_current_record_serialization() {
        let record = sample_record();
        let json = serde_json::to_value(&record).expect("serialization failed");
        assert!(json["last_updated"].is_string());
        assert!(json.get("deleted_at").is_none());

        let back: CurrentRecord = serde_json::from_value(json).expect("deserialization failed");
        assert_eq!(back.id, record.id);
        assert_eq!(back.version_id, 1);
        assert_eq!(back.indexed, record.indexed);
    }

    #[test]
    fn test_current_record_deleted_state() {
        let mut record = sample_record();
        assert!(!record.is_deleted());
        record.deleted_at = Some(now_utc());
        assert!(record.is_deleted());
    }

    #[test]
    fn test_history_record_surrogate_keys_differ() {
        let record = sample_record();
        let a = HistoryRecord::new(record.clone(), HistoryMethod::Create);
        let b = HistoryRecord::new(record, HistoryMethod::Update);
        assert_ne!(a.entry_id, b.entry_id);
        assert_eq!(a.version_id(), 1);
        assert!(!a.method.is_delete());
    }

    #[test]
    fn test_history_method_serialization() {
        assert_eq!(
            serde_json::to_string(&HistoryMethod::Delete).unwrap(),
            "\"delete\""
        );
        let method: HistoryMethod = serde_json::from_str("\"update\"").unwrap();
        assert_eq!(method, HistoryMethod::Update);
        assert!(HistoryMethod::Delete.is_delete());
        assert_eq!(HistoryMethod::Create.to_string(), "create");
    }
}
