//! Composite validation error for outbox messages.

use std::fmt;

use crate::domain::foundation::ValidationError;

/// Every invariant a message violated, collected in one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageValidationError {
    violations: Vec<ValidationError>,
}

impl MessageValidationError {
    /// Wraps a non-empty list of violations.
    pub(crate) fn new(violations: Vec<ValidationError>) -> Self {
        Self { violations }
    }

    /// Returns the violations in field order.
    pub fn violations(&self) -> &[ValidationError] {
        &self.violations
    }

    /// Checks whether the given field is among the violations.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field() == field)
    }
}

impl fmt::Display for MessageValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid message: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for MessageValidationError {}
