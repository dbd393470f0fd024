//! # fhirvault-storage
//!
//! The storage boundary and the versioned-resource store.
//!
//! [`TableStore`] and [`TableTransaction`] define the contract a backend
//! must meet: one current/history table pair per resource type and atomic
//! multi-statement commits with rollback. [`VersionStore`] builds the
//! engine's write semantics on top — contiguous per-id versions, optimistic
//! concurrency, history-before-current write order, soft deletion as state.
//!
//! ## Example
//!
//! ```ignore
//! use fhirvault_storage::VersionStore;
//!
//! let store = VersionStore::new(backend, medication_codec);
//! let created = store.create(&document).await?;
//! let updated = store.update(&created.id, &revised, created.version_id).await?;
//! ```

mod store;
mod traits;

pub use store::{HistoryQuery, VersionStore};
pub use traits::{DynTableStore, TableStore, TableTransaction};
