//! # fhirvault-search
//!
//! Convention-based search over current tables. Parameter names map to
//! indexed columns by naming rule (`status` → `status`, `code` →
//! `medication_code`, `manufacturer` → `manufacturerId`), values OR within a
//! parameter and AND across parameters, soft-deleted rows stay invisible
//! unless explicitly requested, and results page deterministically by
//! logical id. Unmappable parameters fail fast — silent partial filtering is
//! a correctness bug, not a feature.

mod params;
mod plan;
mod translator;

pub use params::{SearchConfig, SearchParams, SearchResult};
pub use plan::{ColumnPredicate, SearchPlan};
pub use translator::SearchTranslator;
