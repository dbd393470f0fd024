//! Compiled search plans.
//!
//! A plan is the parameterized form of a search: column predicates plus
//! pagination, detached from any execution strategy. The in-memory executor
//! evaluates plans against scanned rows; a relational backend can bind the
//! same predicates as SQL parameters.

use fhirvault_core::CurrentRecord;

/// One indexed-column predicate. Values are OR-ed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPredicate {
    /// Indexed column on the current table.
    pub column: String,
    /// Accepted values for the column.
    pub values: Vec<String>,
}

impl ColumnPredicate {
    fn matches(&self, record: &CurrentRecord) -> bool {
        match record.indexed.get(&self.column) {
            Some(stored) => self.values.iter().any(|value| value == stored),
            None => false,
        }
    }
}

/// A fully translated search over one resource type's current table.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    /// Resource type the plan targets.
    pub resource_type: String,
    /// Column predicates; all must hold (AND).
    pub predicates: Vec<ColumnPredicate>,
    /// Logical-id filter from the reserved `_id` parameter.
    pub id_filter: Option<Vec<String>>,
    /// Whether soft-deleted rows participate.
    pub include_deleted: bool,
    /// Page size.
    pub count: u32,
    /// Rows to skip.
    pub offset: u32,
}

impl SearchPlan {
    /// Whether a current row satisfies every filter of this plan.
    #[must_use]
    pub fn matches(&self, record: &CurrentRecord) -> bool {
        if record.is_deleted() && !self.include_deleted {
            return false;
        }
        if let Some(ids) = &self.id_filter
            && !ids.iter().any(|id| id == &record.id)
        {
            return false;
        }
        self.predicates.iter().all(|predicate| predicate.matches(record))
    }
}
