//! Error types for CloudCMS operations

use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("no such entity: {kind} {key}")]
    NotFound { kind: String, key: String },

    /// Capacity or quota exhausted. Clients should retry later.
    #[error("over quota: {reason}")]
    OverQuota { reason: String },

    #[error("Stored document for {kind} {key} is corrupt: {reason}")]
    Corrupt {
        kind: String,
        key: String,
        reason: String,
    },

    #[error("Storage backend failure: {reason}")]
    Backend { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn not_found(kind: impl Into<String>, key: impl ToString) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: key.to_string(),
        }
    }

    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }

    pub fn is_over_quota(&self) -> bool {
        matches!(self, Self::OverQuota { .. })
    }
}

/// Validation errors. Raised before any store access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Mandatory Id/Key for {operation} is missing or invalid")]
    MissingId { operation: String },

    #[error("Invalid id '{value}': expected a positive integer")]
    InvalidId { value: String },

    #[error("Invalid timestamp for {field}: '{value}' - correct format is RFC3339")]
    InvalidTimestamp { field: String, value: String },

    #[error("Invalid boolean for {field}: '{value}' - expected 'true' or 'false'")]
    InvalidBoolean { field: String, value: String },

    #[error("Invalid increment {value}: usage counters never decrease")]
    InvalidIncrement { value: i64 },

    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all CloudCMS errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CmsError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for CloudCMS operations.
pub type CmsResult<T> = Result<T, CmsError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::not_found("Chart", 42);
        let msg = format!("{}", err);
        assert!(msg.contains("no such entity"));
        assert!(msg.contains("Chart"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_over_quota_is_distinguishable() {
        let err = StorageError::OverQuota {
            reason: "map full".to_string(),
        };
        assert!(err.is_over_quota());
        assert!(!StorageError::backend("io").is_over_quota());
    }

    #[test]
    fn test_missing_id_message() {
        let err = ValidationError::MissingId {
            operation: "Update".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Mandatory Id/Key for Update is missing or invalid"
        );
    }

    #[test]
    fn test_cms_error_from_conversions() {
        let err: CmsError = ValidationError::InvalidIncrement { value: -2 }.into();
        assert!(matches!(err, CmsError::Validation(_)));

        let err: CmsError = StorageError::LockPoisoned.into();
        assert!(err.to_string().starts_with("Storage error"));
    }
}
