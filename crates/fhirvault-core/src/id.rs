//! Logical and transaction identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generates a new logical resource id.
///
/// Logical ids are stable across all versions of a resource; the version
/// store assigns one when a created document carries none.
#[must_use]
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Opaque identifier of one write transaction.
///
/// A mutation stamps the same `TransactionId` on the current record and the
/// history record it writes, tying both rows to the same commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a fresh transaction id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying uuid.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_transaction_id_roundtrip() {
        let tx = TransactionId::new();
        let json = serde_json::to_string(&tx).unwrap();
        let back: TransactionId = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, back);
    }

    #[test]
    fn test_transaction_id_display_is_uuid() {
        let tx = TransactionId::new();
        assert!(Uuid::parse_str(&tx.to_string()).is_ok());
    }
}
