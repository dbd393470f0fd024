//! # fhirvault-core
//!
//! Shared types for the fhirvault versioned-resource engine: the record
//! shapes backing every resource type's current/history table pair, logical
//! and transaction identifiers, and the error taxonomy surfaced at the
//! façade boundary.
//!
//! This crate holds no persistence or search logic — those live in
//! `fhirvault-storage` and `fhirvault-search` and depend on the shapes here.

pub mod error;
pub mod id;
pub mod record;
pub mod time;

pub use error::{ErrorCategory, VaultError, VaultResult};
pub use id::{TransactionId, generate_id};
pub use record::{CurrentRecord, HistoryMethod, HistoryRecord, IndexedFields};
pub use time::{format_rfc3339, now_utc};
