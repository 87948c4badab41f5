//! Planner canvas error types

use thiserror::Error;

/// Planner canvas errors
#[derive(Error, Debug)]
pub enum CanvasError {
    /// Plan not found by id
    #[error("Plan {0} not found")]
    PlanNotFound(i32),

    /// Element not found on the board
    #[error("Canvas element '{0}' not found")]
    ElementNotFound(String),

    /// Element collection could not be (de)serialised
    #[error("Canvas serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database operation failed
    #[error("Database error: {0}")]
    Persistence(#[from] sea_orm::DbErr),

    /// Non-database store failure
    #[error("Store error: {0}")]
    Store(String),
}

impl CanvasError {
    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CanvasError::PlanNotFound(_) | CanvasError::ElementNotFound(_)
        )
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            CanvasError::PlanNotFound(_) | CanvasError::ElementNotFound(_) => "NOT_FOUND",
            CanvasError::Serialization(_) => "DATA_CORRUPTED",
            CanvasError::Persistence(_) => "DATABASE_ERROR",
            CanvasError::Store(_) => "STORE_ERROR",
        }
    }
}
