//! Project row error types
//!
//! Errors raised by make mode progression, field-level edits and structural
//! row operations (insert, duplicate, delete, reorder).

use thiserror::Error;

/// Project row errors
#[derive(Error, Debug)]
pub enum RowError {
    /// Row not found by id
    #[error("Row '{0}' not found")]
    NotFound(String),

    /// Project not found by id
    #[error("Project {0} not found")]
    ProjectNotFound(i32),

    /// Input rejected before reaching the store
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Dividers never carry make mode progress
    #[error("Row '{0}' is a divider and cannot track progress")]
    DividerNotTrackable(String),

    /// Reorder indices outside the row collection
    #[error("Reorder index {index} out of range for {len} rows")]
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Number of rows in the project
        len: usize,
    },

    /// Stored value could not be mapped onto a row field
    #[error("Invalid stored value for {field}: '{value}'")]
    InvalidStoredValue {
        /// Column name
        field: &'static str,
        /// Raw stored value
        value: String,
    },

    /// Database operation failed
    #[error("Database error: {0}")]
    Persistence(#[from] sea_orm::DbErr),

    /// Non-database store failure
    #[error("Store error: {0}")]
    Store(String),
}

impl RowError {
    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RowError::Validation(_)
                | RowError::DividerNotTrackable(_)
                | RowError::IndexOutOfRange { .. }
        )
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, RowError::NotFound(_) | RowError::ProjectNotFound(_))
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            RowError::NotFound(_) | RowError::ProjectNotFound(_) => "NOT_FOUND",
            RowError::Validation(_)
            | RowError::DividerNotTrackable(_)
            | RowError::IndexOutOfRange { .. } => "VALIDATION_FAILED",
            RowError::InvalidStoredValue { .. } => "DATA_CORRUPTED",
            RowError::Persistence(_) => "DATABASE_ERROR",
            RowError::Store(_) => "STORE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found() {
        let err = RowError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Row 'abc' not found");
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_divider_not_trackable_is_client_error() {
        let err = RowError::DividerNotTrackable("d1".to_string());
        assert!(err.is_client_error());
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn test_index_out_of_range_message() {
        let err = RowError::IndexOutOfRange { index: 5, len: 3 };
        assert_eq!(err.to_string(), "Reorder index 5 out of range for 3 rows");
    }

    #[test]
    fn test_store_error_is_not_client_error() {
        let err = RowError::Store("connection reset".to_string());
        assert!(!err.is_client_error());
        assert_eq!(err.error_code(), "STORE_ERROR");
    }
}
