//! Convention-based parameter translation and execution.
//!
//! Parameter names map to indexed columns by naming convention alone — no
//! per-resource-type query code. A parameter that maps to nothing is an
//! error, not a silently dropped filter, and the check runs for every
//! supplied parameter before any storage access.

use tracing::debug;

use fhirvault_codec::ResourceCodec;
use fhirvault_core::{VaultError, VaultResult};
use fhirvault_storage::TableStore;

use crate::params::{SearchConfig, SearchParams, SearchResult};
use crate::plan::{ColumnPredicate, SearchPlan};

/// Translates search parameters into plans and executes them.
#[derive(Debug, Clone, Default)]
pub struct SearchTranslator {
    config: SearchConfig,
}

impl SearchTranslator {
    /// Creates a translator with the given pagination limits.
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Compiles parameters into a plan against one codec's column metadata.
    ///
    /// Fails with `UnsupportedSearchParameter` for any parameter — reserved
    /// or not — that the convention cannot map.
    pub fn plan(
        &self,
        codec: &dyn ResourceCodec,
        params: &SearchParams,
    ) -> VaultResult<SearchPlan> {
        let resource_type = codec.resource_type();
        let mut predicates = Vec::new();
        let mut id_filter = None;
        let mut include_deleted = false;
        let mut count = params.count;
        let mut offset = params.offset;

        for (name, values) in &params.parameters {
            match name.as_str() {
                "_id" => id_filter = Some(values.clone()),
                "_includeDeleted" => {
                    include_deleted = values.iter().any(|value| value == "true");
                }
                "_count" => count = Some(parse_control(resource_type, name, values)?),
                "_offset" => offset = Some(parse_control(resource_type, name, values)?),
                _ if name.starts_with('_') => {
                    return Err(VaultError::unsupported_search_parameter(resource_type, name));
                }
                _ => match derive_column(codec, name) {
                    Some(column) => predicates.push(ColumnPredicate {
                        column,
                        values: values.clone(),
                    }),
                    None => {
                        return Err(VaultError::unsupported_search_parameter(
                            resource_type,
                            name,
                        ));
                    }
                },
            }
        }

        Ok(SearchPlan {
            resource_type: resource_type.to_string(),
            predicates,
            id_filter,
            include_deleted,
            count: count
                .unwrap_or(self.config.default_count)
                .min(self.config.max_count),
            offset: offset.unwrap_or(0),
        })
    }

    /// Plans and executes a search, returning canonical documents.
    ///
    /// Rows are ordered by logical id so pagination stays deterministic
    /// across pages even under concurrent writes.
    pub async fn search(
        &self,
        tables: &dyn TableStore,
        codec: &dyn ResourceCodec,
        params: &SearchParams,
    ) -> VaultResult<SearchResult> {
        let plan = self.plan(codec, params)?;

        let mut rows = tables.scan_current(&plan.resource_type).await?;
        rows.retain(|record| plan.matches(record));
        rows.sort_by(|a, b| a.id.cmp(&b.id));

        let total = rows.len() as u32;
        let offset = plan.offset as usize;
        let page: Vec<_> = rows
            .into_iter()
            .skip(offset)
            .take(plan.count as usize)
            .collect();
        let has_more = offset + page.len() < total as usize;

        debug!(
            resource_type = %plan.resource_type,
            total,
            page = page.len(),
            "executed search"
        );

        Ok(SearchResult {
            entries: page.iter().map(|record| codec.to_document(record)).collect(),
            total,
            has_more,
        })
    }
}

/// Derives the indexed column for a parameter name.
///
/// Candidates, in order: the name itself, `<type>_<name>` with the
/// lower-cased resource prefix, and `<name>Id` for reference-typed
/// parameters. The first candidate present in the codec's column metadata
/// wins.
fn derive_column(codec: &dyn ResourceCodec, name: &str) -> Option<String> {
    let columns = codec.index_columns();
    let candidates = [
        name.to_string(),
        format!("{}_{name}", codec.resource_type().to_lowercase()),
        format!("{name}Id"),
    ];
    candidates
        .into_iter()
        .find(|candidate| columns.contains(&candidate.as_str()))
}

fn parse_control(resource_type: &str, name: &str, values: &[String]) -> VaultResult<u32> {
    values
        .first()
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| {
            VaultError::invalid_resource(format!(
                "{resource_type} search: {name} must be a non-negative integer"
            ))
        })
}
