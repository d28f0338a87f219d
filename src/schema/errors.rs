//! Schema error types
//!
//! A `ValidationError` collects every field that violated its constraint,
//! in declaration order, so the caller sees all problems in one response.

use std::fmt;

/// A single field-level constraint violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as it appears in request bodies
    pub field: &'static str,
    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Raised when a student record violates its schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// Build from the collected field errors, in declaration order
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Single-field error
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// All field errors, in declaration order
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message for the given field, if that field failed
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Student validation failed: ")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_field() {
        let err = ValidationError::new(vec![
            FieldError::new("name", "Student name is required"),
            FieldError::new("age", "Age must be at least 1"),
        ]);

        assert_eq!(
            err.to_string(),
            "Student validation failed: name: Student name is required, age: Age must be at least 1"
        );
    }

    #[test]
    fn test_message_for_field() {
        let err = ValidationError::single("course", "Course is required");
        assert_eq!(err.message_for("course"), Some("Course is required"));
        assert_eq!(err.message_for("name"), None);
    }
}
