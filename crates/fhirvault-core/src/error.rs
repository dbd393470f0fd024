//! Error taxonomy for the fhirvault engine.
//!
//! Every crate in the workspace surfaces this single error type; the façade
//! returns it to callers with enough detail (id, expected vs. actual version)
//! for the transport layer to render a protocol-appropriate response.

use std::fmt;

/// Errors that can occur during versioned-resource operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// The requested resource has no current record, or is soft-deleted and
    /// a deletion-inclusive read was not requested.
    #[error("Resource not found: {resource_type}/{id}")]
    NotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// The logical id that was not found.
        id: String,
    },

    /// The expected version did not match the current version at write time.
    /// The caller is expected to re-read and retry; the engine never retries
    /// on its own.
    #[error("Version conflict on {resource_type}/{id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// The type of resource being written.
        resource_type: String,
        /// The logical id being written.
        id: String,
        /// The version the caller expected.
        expected: i64,
        /// The version actually stored.
        actual: i64,
    },

    /// Attempted to create a resource whose id already has a current record.
    #[error("Resource already exists: {resource_type}/{id}")]
    AlreadyExists {
        /// The type of resource that already exists.
        resource_type: String,
        /// The logical id that already exists.
        id: String,
    },

    /// A search parameter has no convention-derived column mapping.
    /// Surfaced immediately; never silently dropped.
    #[error("Unsupported search parameter for {resource_type}: {name}")]
    UnsupportedSearchParameter {
        /// The resource type being searched.
        resource_type: String,
        /// The offending parameter name.
        name: String,
    },

    /// No façade is registered for the requested resource type.
    #[error("Unsupported resource type: {name}")]
    UnsupportedResourceType {
        /// The unrecognized resource type label.
        name: String,
    },

    /// The supplied document is malformed at the boundary.
    #[error("Invalid resource: {message}")]
    InvalidResource {
        /// Description of why the document is invalid.
        message: String,
    },

    /// Underlying transaction/connection failure. Always causes a full
    /// rollback; a partially applied write is never observable.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },
}

impl VaultError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates a new `VersionConflict` error.
    #[must_use]
    pub fn version_conflict(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        expected: i64,
        actual: i64,
    ) -> Self {
        Self::VersionConflict {
            resource_type: resource_type.into(),
            id: id.into(),
            expected,
            actual,
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates a new `UnsupportedSearchParameter` error.
    #[must_use]
    pub fn unsupported_search_parameter(
        resource_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::UnsupportedSearchParameter {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Creates a new `UnsupportedResourceType` error.
    #[must_use]
    pub fn unsupported_resource_type(name: impl Into<String>) -> Self {
        Self::UnsupportedResourceType { name: name.into() }
    }

    /// Creates a new `InvalidResource` error.
    #[must_use]
    pub fn invalid_resource(message: impl Into<String>) -> Self {
        Self::InvalidResource {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a version conflict error.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns `true` if this error rejects a search parameter.
    #[must_use]
    pub fn is_unsupported_search_parameter(&self) -> bool {
        matches!(self, Self::UnsupportedSearchParameter { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::VersionConflict { .. } | Self::AlreadyExists { .. } => ErrorCategory::Conflict,
            Self::UnsupportedSearchParameter { .. }
            | Self::UnsupportedResourceType { .. }
            | Self::InvalidResource { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Storage,
        }
    }
}

/// Categories of engine errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Resource not found.
    NotFound,
    /// Conflict (version or existence).
    Conflict,
    /// Validation error (bad parameter, bad document, unknown type).
    Validation,
    /// Transaction/connection failure.
    Storage,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

/// Convenience result type for engine operations.
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::not_found("Medication", "123");
        assert_eq!(err.to_string(), "Resource not found: Medication/123");

        let err = VaultError::version_conflict("Medication", "123", 1, 2);
        assert_eq!(
            err.to_string(),
            "Version conflict on Medication/123: expected 1, found 2"
        );

        let err = VaultError::already_exists("Schedule", "456");
        assert_eq!(err.to_string(), "Resource already exists: Schedule/456");

        let err = VaultError::unsupported_search_parameter("Medication", "bogus-param");
        assert_eq!(
            err.to_string(),
            "Unsupported search parameter for Medication: bogus-param"
        );
    }

    #[test]
    fn test_error_predicates() {
        let err = VaultError::not_found("Medication", "123");
        assert!(err.is_not_found());
        assert!(!err.is_version_conflict());

        let err = VaultError::version_conflict("Medication", "123", 3, 4);
        assert!(err.is_version_conflict());
        assert!(!err.is_already_exists());

        let err = VaultError::unsupported_search_parameter("Medication", "bogus");
        assert!(err.is_unsupported_search_parameter());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            VaultError::not_found("Medication", "1").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            VaultError::version_conflict("Medication", "1", 1, 2).category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            VaultError::already_exists("Medication", "1").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            VaultError::invalid_resource("bad document").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            VaultError::storage("connection reset").category(),
            ErrorCategory::Storage
        );
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
        assert_eq!(ErrorCategory::Conflict.to_string(), "conflict");
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Storage.to_string(), "storage");
    }
}
