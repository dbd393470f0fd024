//! Storage boundary traits.
//!
//! A backend owns one current/history table pair per resource type and must
//! support atomic multi-statement commits with rollback. Backends are
//! injected into the version store by parameter — there is no ambient
//! datasource — so tests can supply fault-injecting implementations.

use async_trait::async_trait;

use fhirvault_core::{CurrentRecord, HistoryRecord, VaultResult};

/// A storage backend for current/history table pairs.
///
/// Read methods return committed state only and never filter soft-deleted
/// rows — visibility rules live in the version store and search translator,
/// not in the backend.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Opens a transaction against one resource type's table pair.
    async fn begin(&self, resource_type: &str) -> VaultResult<Box<dyn TableTransaction>>;

    /// Fetches the current row for a logical id, soft-deleted included.
    async fn get_current(
        &self,
        resource_type: &str,
        id: &str,
    ) -> VaultResult<Option<CurrentRecord>>;

    /// Fetches every current row of a resource type, soft-deleted included.
    async fn scan_current(&self, resource_type: &str) -> VaultResult<Vec<CurrentRecord>>;

    /// Fetches a logical id's history rows, ascending by version.
    async fn list_history(
        &self,
        resource_type: &str,
        id: &str,
    ) -> VaultResult<Vec<HistoryRecord>>;

    /// Fetches one specific version from history.
    async fn get_version(
        &self,
        resource_type: &str,
        id: &str,
        version_id: i64,
    ) -> VaultResult<Option<HistoryRecord>>;

    /// Name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// A transaction over one resource type's table pair.
///
/// Statements are not visible to other callers until `commit`; either every
/// statement commits or none does. Dropping an uncommitted transaction rolls
/// it back, so error propagation with `?` can never leave a partial write
/// behind.
#[async_trait]
pub trait TableTransaction: Send + Sync {
    /// Reads the current row for a logical id, seeing this transaction's own
    /// uncommitted statements. Soft-deleted rows are returned as-is.
    async fn read_current(&mut self, id: &str) -> VaultResult<Option<CurrentRecord>>;

    /// Inserts a new current row. Fails with `AlreadyExists` when the id
    /// already has a row, committed or staged.
    async fn insert_current(&mut self, record: CurrentRecord) -> VaultResult<()>;

    /// Overwrites the current row for the record's logical id.
    async fn put_current(&mut self, record: CurrentRecord) -> VaultResult<()>;

    /// Appends one history row.
    async fn append_history(&mut self, record: HistoryRecord) -> VaultResult<()>;

    /// Commits all statements atomically. Consumes the transaction.
    async fn commit(self: Box<Self>) -> VaultResult<()>;

    /// Discards all statements. Consumes the transaction.
    async fn rollback(self: Box<Self>) -> VaultResult<()>;
}

/// Type alias for a shared storage backend handle.
pub type DynTableStore = std::sync::Arc<dyn TableStore>;
