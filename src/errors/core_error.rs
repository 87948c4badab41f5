use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use super::{CanvasError, RowError};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreErrorKind {
    NotFound,
    Validation,
    Conflict,
    Unavailable,
    Internal,
}

#[derive(Debug)]
pub struct CoreError {
    kind: CoreErrorKind,
    message: String,
    fields: Option<BTreeMap<String, String>>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: None,
            source: None,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("entity".to_string(), entity.into());
        fields.insert("id".to_string(), id.into());

        Self {
            kind: CoreErrorKind::NotFound,
            message: "Resource not found".to_string(),
            fields: Some(fields),
            source: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Validation, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Conflict, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Unavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Internal, message)
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> CoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        self.fields.as_ref()
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl StdError for CoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<RowError> for CoreError {
    fn from(err: RowError) -> Self {
        let kind = if err.is_not_found() {
            CoreErrorKind::NotFound
        } else if err.is_client_error() {
            CoreErrorKind::Validation
        } else {
            CoreErrorKind::Unavailable
        };
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

impl From<CanvasError> for CoreError {
    fn from(err: CanvasError) -> Self {
        let kind = if err.is_not_found() {
            CoreErrorKind::NotFound
        } else {
            CoreErrorKind::Unavailable
        };
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

impl From<sea_orm::DbErr> for CoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        CoreError::unavailable(format!("Database error: {}", err)).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_carries_fields() {
        let err = CoreError::not_found("Project", "7");
        assert_eq!(err.kind(), CoreErrorKind::NotFound);
        let fields = err.fields().unwrap();
        assert_eq!(fields.get("entity").map(String::as_str), Some("Project"));
        assert_eq!(fields.get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_row_error_conversion_keeps_category() {
        let err: CoreError = RowError::Validation("empty id".to_string()).into();
        assert_eq!(err.kind(), CoreErrorKind::Validation);
        assert!(err.source().is_some());

        let err: CoreError = RowError::NotFound("r1".to_string()).into();
        assert_eq!(err.kind(), CoreErrorKind::NotFound);
    }

    #[test]
    fn test_canvas_error_conversion() {
        let err: CoreError = CanvasError::PlanNotFound(3).into();
        assert_eq!(err.kind(), CoreErrorKind::NotFound);

        let err: CoreError = CanvasError::Store("disk full".to_string()).into();
        assert_eq!(err.kind(), CoreErrorKind::Unavailable);
        assert!(err.message().contains("disk full"));
    }

    #[test]
    fn test_display_includes_kind() {
        let err = CoreError::internal("boom");
        assert_eq!(err.to_string(), "Internal: boom");
    }
}
