//! # fhirvault-codec
//!
//! The resource codec seam: every resource type supplies its own extraction
//! rules, but all obey the same two-function contract — `from_document`
//! shapes a raw clinical document into a flat indexable record, and
//! `to_document` reconstructs the externally visible resource by overlaying
//! authoritative metadata. The version store and search translator stay fully
//! generic against this trait.
//!
//! Most resource types need no hand-written code at all: [`IndexedCodec`]
//! interprets a static table of [`IndexRule`]s, and [`registry::builtin_codecs`]
//! ships the rule tables for the clinical resource types the engine serves
//! out of the box.

pub mod extract;
pub mod registry;
mod rules;

pub use rules::{Extract, IndexRule, IndexedCodec};

use serde_json::{Value, json};

use fhirvault_core::{CurrentRecord, IndexedFields, TransactionId, format_rfc3339, now_utc};

/// Converts between raw clinical documents and flat indexable records.
///
/// Implementations must be pure over the document: the same document always
/// yields the same indexed fields, and absent optional substructures leave
/// columns unset rather than failing the write.
pub trait ResourceCodec: Send + Sync {
    /// The resource type label this codec serves (e.g. `"Medication"`).
    fn resource_type(&self) -> &str;

    /// Indexed-column metadata the search translator maps parameters against.
    fn index_columns(&self) -> &[&'static str];

    /// Extracts the indexed scalar columns from a document.
    fn extract_index(&self, document: &Value) -> IndexedFields;

    /// Shapes a document into a record ready for the version store.
    ///
    /// The stored blob drops `id` and `meta` — both are overlaid again by
    /// [`to_document`](Self::to_document), so the blob never needs rewriting
    /// for metadata-only changes. `version_id` is left unassigned (0); the
    /// version store owns version numbering.
    fn from_document(&self, document: &Value, transaction_id: TransactionId) -> CurrentRecord {
        let mut blob = document.clone();
        let mut id = String::new();
        if let Some(obj) = blob.as_object_mut() {
            if let Some(Value::String(document_id)) = obj.remove("id") {
                id = document_id;
            }
            obj.remove("meta");
        }
        CurrentRecord {
            id,
            version_id: 0,
            last_updated: now_utc(),
            transaction_id,
            document: blob,
            deleted_at: None,
            indexed: self.extract_index(document),
        }
    }

    /// Reconstructs the externally visible resource from a record.
    fn to_document(&self, record: &CurrentRecord) -> Value {
        let mut document = record.document.clone();
        if let Some(obj) = document.as_object_mut() {
            obj.insert("id".to_string(), Value::String(record.id.clone()));
            obj.insert(
                "meta".to_string(),
                json!({
                    "versionId": record.version_id.to_string(),
                    "lastUpdated": format_rfc3339(record.last_updated),
                }),
            );
        }
        document
    }
}

// Compile-time check that the codec seam stays object-safe.
#[cfg(test)]
fn _assert_codec_object_safe(_: &dyn ResourceCodec) {}
