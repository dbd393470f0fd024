//! In-memory table pairs with transactional commit.
//!
//! All table pairs live behind a single `tokio::sync::RwLock`. A transaction
//! takes the owned write guard at `begin`, stages its statements, and applies
//! them while still holding the guard at `commit` — readers can never observe
//! a half-applied transaction, and a dropped transaction discards its staged
//! statements. Writers to different resource types serialize on the same
//! guard; transactions here are short, in-memory sections with no client
//! round-trips inside.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use fhirvault_core::{CurrentRecord, HistoryRecord, VaultError, VaultResult};
use fhirvault_storage::{TableStore, TableTransaction};

/// One resource type's current/history table pair.
#[derive(Debug, Default)]
struct TablePair {
    current: HashMap<String, CurrentRecord>,
    history: HashMap<String, Vec<HistoryRecord>>,
}

type Tables = HashMap<String, TablePair>;

/// In-memory storage backend.
///
/// Cloning is cheap; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryTableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of current rows across all resource types, soft-deleted
    /// included.
    pub async fn row_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.values().map(|pair| pair.current.len()).sum()
    }
}

enum Statement {
    InsertCurrent(CurrentRecord),
    PutCurrent(CurrentRecord),
    AppendHistory(HistoryRecord),
}

struct MemoryTransaction {
    resource_type: String,
    // Held from begin to commit/rollback; dropping it releases the tables
    // without applying anything.
    guard: Option<OwnedRwLockWriteGuard<Tables>>,
    staged: Vec<Statement>,
}

impl MemoryTransaction {
    fn guard(&self) -> VaultResult<&OwnedRwLockWriteGuard<Tables>> {
        self.guard
            .as_ref()
            .ok_or_else(|| VaultError::storage("transaction already finished"))
    }

    fn staged_row(&self, id: &str) -> Option<&CurrentRecord> {
        self.staged.iter().rev().find_map(|statement| match statement {
            Statement::InsertCurrent(record) | Statement::PutCurrent(record)
                if record.id == id =>
            {
                Some(record)
            }
            _ => None,
        })
    }
}

#[async_trait]
impl TableTransaction for MemoryTransaction {
    async fn read_current(&mut self, id: &str) -> VaultResult<Option<CurrentRecord>> {
        if let Some(record) = self.staged_row(id) {
            return Ok(Some(record.clone()));
        }
        let tables = self.guard()?;
        Ok(tables
            .get(&self.resource_type)
            .and_then(|pair| pair.current.get(id))
            .cloned())
    }

    async fn insert_current(&mut self, record: CurrentRecord) -> VaultResult<()> {
        let exists = self.staged_row(&record.id).is_some()
            || self
                .guard()?
                .get(&self.resource_type)
                .is_some_and(|pair| pair.current.contains_key(&record.id));
        if exists {
            return Err(VaultError::already_exists(&self.resource_type, record.id));
        }
        self.staged.push(Statement::InsertCurrent(record));
        Ok(())
    }

    async fn put_current(&mut self, record: CurrentRecord) -> VaultResult<()> {
        self.guard()?;
        self.staged.push(Statement::PutCurrent(record));
        Ok(())
    }

    async fn append_history(&mut self, record: HistoryRecord) -> VaultResult<()> {
        self.guard()?;
        self.staged.push(Statement::AppendHistory(record));
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> VaultResult<()> {
        let mut tables = self
            .guard
            .take()
            .ok_or_else(|| VaultError::storage("transaction already finished"))?;
        let pair = tables.entry(self.resource_type.clone()).or_default();
        for statement in self.staged.drain(..) {
            match statement {
                Statement::InsertCurrent(record) | Statement::PutCurrent(record) => {
                    pair.current.insert(record.id.clone(), record);
                }
                Statement::AppendHistory(record) => {
                    pair.history
                        .entry(record.record.id.clone())
                        .or_default()
                        .push(record);
                }
            }
        }
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> VaultResult<()> {
        self.guard.take();
        self.staged.clear();
        Ok(())
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn begin(&self, resource_type: &str) -> VaultResult<Box<dyn TableTransaction>> {
        let guard = Arc::clone(&self.tables).write_owned().await;
        Ok(Box::new(MemoryTransaction {
            resource_type: resource_type.to_string(),
            guard: Some(guard),
            staged: Vec::new(),
        }))
    }

    async fn get_current(
        &self,
        resource_type: &str,
        id: &str,
    ) -> VaultResult<Option<CurrentRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(resource_type)
            .and_then(|pair| pair.current.get(id))
            .cloned())
    }

    async fn scan_current(&self, resource_type: &str) -> VaultResult<Vec<CurrentRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(resource_type)
            .map(|pair| pair.current.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_history(
        &self,
        resource_type: &str,
        id: &str,
    ) -> VaultResult<Vec<HistoryRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(resource_type)
            .and_then(|pair| pair.history.get(id))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_version(
        &self,
        resource_type: &str,
        id: &str,
        version_id: i64,
    ) -> VaultResult<Option<HistoryRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(resource_type)
            .and_then(|pair| pair.history.get(id))
            .and_then(|entries| entries.iter().find(|e| e.version_id() == version_id))
            .cloned())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
