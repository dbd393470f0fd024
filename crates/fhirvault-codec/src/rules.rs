//! Rule-table-driven codec.
//!
//! A resource type's extraction logic is a static slice of [`IndexRule`]s;
//! [`IndexedCodec`] interprets the table. Adding a resource type to the
//! engine is a registry entry, not a new service class.

use serde_json::Value;

use fhirvault_core::IndexedFields;

use crate::ResourceCodec;
use crate::extract;

/// How one indexed column is pulled out of a document.
#[derive(Debug, Clone, Copy)]
pub enum Extract {
    /// Top-level scalar field (strings, booleans, numbers).
    Scalar(&'static str),
    /// First coding code of a codeable element, optionally restricted to a
    /// coding system URI.
    Coding {
        /// Document element holding the codeable value.
        element: &'static str,
        /// Required coding system, or any system when `None`.
        system: Option<&'static str>,
    },
    /// Target id recovered from a reference element (`Type/id` pattern).
    Reference(&'static str),
    /// First identifier value, optionally restricted to an identifier system.
    Identifier {
        /// Required identifier system, or the first identifier when `None`.
        system: Option<&'static str>,
    },
}

/// One indexed column and its extraction rule.
#[derive(Debug, Clone, Copy)]
pub struct IndexRule {
    /// Name of the indexed column on the current table.
    pub column: &'static str,
    /// How the column value is derived from the document.
    pub extract: Extract,
}

impl IndexRule {
    /// Column fed by a top-level scalar field.
    #[must_use]
    pub const fn scalar(column: &'static str, field: &'static str) -> Self {
        Self {
            column,
            extract: Extract::Scalar(field),
        }
    }

    /// Column fed by the first coding code of an element.
    #[must_use]
    pub const fn coding(column: &'static str, element: &'static str) -> Self {
        Self {
            column,
            extract: Extract::Coding {
                element,
                system: None,
            },
        }
    }

    /// Column fed by the coding code of an element for one coding system.
    #[must_use]
    pub const fn coding_system(
        column: &'static str,
        element: &'static str,
        system: &'static str,
    ) -> Self {
        Self {
            column,
            extract: Extract::Coding {
                element,
                system: Some(system),
            },
        }
    }

    /// Column fed by a reference element's target id.
    #[must_use]
    pub const fn reference(column: &'static str, element: &'static str) -> Self {
        Self {
            column,
            extract: Extract::Reference(element),
        }
    }

    /// Column fed by the first identifier value.
    #[must_use]
    pub const fn identifier(column: &'static str) -> Self {
        Self {
            column,
            extract: Extract::Identifier { system: None },
        }
    }

    /// Column fed by the identifier value for one identifier system.
    #[must_use]
    pub const fn identifier_system(column: &'static str, system: &'static str) -> Self {
        Self {
            column,
            extract: Extract::Identifier {
                system: Some(system),
            },
        }
    }

    fn apply(&self, document: &Value) -> Option<String> {
        match self.extract {
            Extract::Scalar(field) => extract::scalar(document, field),
            Extract::Coding { element, system } => extract::coding_code(document, element, system),
            Extract::Reference(element) => extract::reference_id(document, element),
            Extract::Identifier { system } => extract::identifier_value(document, system),
        }
    }
}

/// A codec defined entirely by a rule table.
pub struct IndexedCodec {
    resource_type: &'static str,
    rules: &'static [IndexRule],
    columns: Vec<&'static str>,
}

impl IndexedCodec {
    /// Creates a codec for `resource_type` from its rule table.
    #[must_use]
    pub fn new(resource_type: &'static str, rules: &'static [IndexRule]) -> Self {
        let columns = rules.iter().map(|rule| rule.column).collect();
        Self {
            resource_type,
            rules,
            columns,
        }
    }

    /// The rule table backing this codec.
    #[must_use]
    pub fn rules(&self) -> &'static [IndexRule] {
        self.rules
    }
}

impl ResourceCodec for IndexedCodec {
    fn resource_type(&self) -> &str {
        self.resource_type
    }

    fn index_columns(&self) -> &[&'static str] {
        &self.columns
    }

    fn extract_index(&self, document: &Value) -> IndexedFields {
        let mut indexed = IndexedFields::new();
        for rule in self.rules {
            indexed.set_opt(rule.column, rule.apply(document));
        }
        indexed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static TEST_RULES: &[IndexRule] = &[
        IndexRule::scalar("status", "status"),
        IndexRule::coding("code", "code"),
        IndexRule::reference("subjectId", "subject"),
        IndexRule::identifier_system("mrn", "http://hospital.example/mrn"),
    ];

    #[test]
    fn test_indexed_codec_columns_follow_rule_order() {
        let codec = IndexedCodec::new("Observation", TEST_RULES);
        assert_eq!(codec.resource_type(), "Observation");
        assert_eq!(codec.index_columns(), &["status", "code", "subjectId", "mrn"]);
    }

    #[test]
    fn test_extract_index_applies_every_rule() {
        let codec = IndexedCodec::new("Observation", TEST_RULES);
        let indexed = codec.extract_index(&json!({
            "status": "final",
            "code": {"coding": [{"system": "http://loinc.org", "code": "1234-5"}]},
            "subject": {"reference": "Patient/p-1"},
            "identifier": [{"system": "http://hospital.example/mrn", "value": "MRN-9"}]
        }));
        assert_eq!(indexed.get("status"), Some("final"));
        assert_eq!(indexed.get("code"), Some("1234-5"));
        assert_eq!(indexed.get("subjectId"), Some("p-1"));
        assert_eq!(indexed.get("mrn"), Some("MRN-9"));
    }

    #[test]
    fn test_extract_index_is_pure_and_partial() {
        let codec = IndexedCodec::new("Observation", TEST_RULES);
        let sparse = json!({"status": "final"});
        let first = codec.extract_index(&sparse);
        let second = codec.extract_index(&sparse);
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first.get("code"), None);
    }
}
