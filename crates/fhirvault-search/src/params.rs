//! Search parameter and result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parameters for a search query.
///
/// Multiple values for the same key are OR conditions; distinct keys are
/// AND-ed. Keys starting with `_` are reserved control parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    /// Search parameters as key → values.
    pub parameters: BTreeMap<String, Vec<String>>,
    /// Maximum number of results to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Number of results to skip for pagination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl SearchParams {
    /// Creates empty `SearchParams`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a search parameter value.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Sets the count parameter.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the offset parameter.
    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns `true` if no filter parameters were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// Pagination limits for the translator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Page size when the caller does not ask for one.
    pub default_count: u32,
    /// Hard page-size ceiling.
    pub max_count: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_count: 50,
            max_count: 500,
        }
    }
}

/// Result of a search: canonical documents, never raw indexed columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matching documents, ordered by logical id.
    pub entries: Vec<Value>,
    /// Total number of matches before pagination.
    pub total: u32,
    /// Whether more results exist beyond this page.
    pub has_more: bool,
}

impl SearchResult {
    /// Number of entries on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if this page carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
