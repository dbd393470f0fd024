//! # fhirvault-service
//!
//! Composition root of the fhirvault engine: the per-resource façade
//! ([`ResourceService`]) and the resource-type-keyed [`ServiceRegistry`].
//! This is the thin layer the transport plumbing calls into.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fhirvault_db_memory::MemoryTableStore;
//! use fhirvault_search::SearchConfig;
//! use fhirvault_service::ServiceRegistry;
//!
//! let registry = ServiceRegistry::with_builtin(
//!     Arc::new(MemoryTableStore::new()),
//!     SearchConfig::default(),
//! );
//! let medications = registry.get("Medication")?;
//! let created = medications.create(&document).await?;
//! ```

mod registry;
mod service;

pub use registry::ServiceRegistry;
pub use service::{HistoryEntry, ResourceService};
