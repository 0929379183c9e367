//! Error types for the domain layer.

use thiserror::Error;

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field } => field,
            ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("event_topic");
        assert_eq!(format!("{}", err), "Field 'event_topic' cannot be empty");
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("relation", "contains '@'");
        assert_eq!(
            format!("{}", err),
            "Field 'relation' has invalid format: contains '@'"
        );
    }

    #[test]
    fn validation_error_exposes_field() {
        assert_eq!(ValidationError::empty_field("object_type").field(), "object_type");
        assert_eq!(
            ValidationError::invalid_format("resource.id", "x").field(),
            "resource.id"
        );
    }
}
