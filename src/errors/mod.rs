//! Domain-specific error types for stitchboard
//!
//! # Error Categories
//!
//! - **RowError**: project row operations (make mode progression, field edits, structure)
//! - **CanvasError**: planner board loading and auto-save writes
//! - **CoreError**: kind-tagged error used at the CLI and configuration boundary
//!
//! # Examples
//!
//! ```rust
//! use stitchboard::errors::RowError;
//!
//! let err = RowError::NotFound("row-1".to_string());
//! assert!(err.is_not_found());
//!
//! let err = RowError::Validation("Row id cannot be empty".to_string());
//! assert_eq!(err.error_code(), "VALIDATION_FAILED");
//! ```

pub mod canvas;
pub mod core_error;
pub mod row;

pub use canvas::CanvasError;
pub use core_error::{CoreError, CoreErrorKind};
pub use row::RowError;

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for row operations
pub type RowResult<T> = Result<T, RowError>;

/// Result type alias for canvas operations
pub type CanvasResult<T> = Result<T, CanvasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_result_alias() {
        let result: RowResult<()> = Err(RowError::NotFound("r1".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_canvas_result_alias() {
        let result: CanvasResult<()> = Err(CanvasError::PlanNotFound(3));
        assert!(result.is_err());
    }

    #[test]
    fn test_core_result_alias() {
        let result: CoreResult<()> = Err(CoreError::validation("bad input"));
        assert!(result.is_err());
    }
}
