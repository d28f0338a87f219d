//! Field validation for student records
//!
//! Rules:
//! - `name`: required, trimmed, non-empty
//! - `age`: required, integer in [1, 120]
//! - `course`: required, trimmed, non-empty
//!
//! Every rule is checked; all failures are reported together.

use super::errors::{FieldError, SchemaResult, ValidationError};
use super::types::{NewStudent, StudentFields};

/// Lowest accepted age
pub const MIN_AGE: u8 = 1;
/// Highest accepted age
pub const MAX_AGE: u8 = 120;

/// Validates and normalizes a student input.
pub fn validate(input: NewStudent) -> SchemaResult<StudentFields> {
    let name = required_text(input.name, "name", "Student name is required");
    let age = check_age(input.age);
    let course = required_text(input.course, "course", "Course is required");

    match (name, age, course) {
        (Ok(name), Ok(age), Ok(course)) => Ok(StudentFields { name, age, course }),
        (name, age, course) => Err(ValidationError::new(
            [name.err(), age.err(), course.err()]
                .into_iter()
                .flatten()
                .collect(),
        )),
    }
}

fn required_text(
    value: Option<String>,
    field: &'static str,
    message: &str,
) -> Result<String, FieldError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(FieldError::new(field, message)),
    }
}

fn check_age(value: Option<i64>) -> Result<u8, FieldError> {
    let age = value.ok_or_else(|| FieldError::new("age", "Student age is required"))?;
    match u8::try_from(age) {
        Ok(age) if (MIN_AGE..=MAX_AGE).contains(&age) => Ok(age),
        _ if age < i64::from(MIN_AGE) => Err(FieldError::new(
            "age",
            format!("Age must be at least {}", MIN_AGE),
        )),
        // MAX_AGE itself is accepted
        _ => Err(FieldError::new(
            "age",
            format!("Age must be less than {}", MAX_AGE),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input_is_trimmed() {
        let fields = validate(NewStudent::new("  Grace Hopper ", 30, " Computing\t")).unwrap();
        assert_eq!(fields.name, "Grace Hopper");
        assert_eq!(fields.age, 30);
        assert_eq!(fields.course, "Computing");
    }

    #[test]
    fn test_age_bounds_are_inclusive() {
        assert!(validate(NewStudent::new("A", 1, "B")).is_ok());
        assert!(validate(NewStudent::new("A", 120, "B")).is_ok());

        let low = validate(NewStudent::new("A", 0, "B")).unwrap_err();
        assert_eq!(low.message_for("age"), Some("Age must be at least 1"));

        let high = validate(NewStudent::new("A", 121, "B")).unwrap_err();
        assert_eq!(high.message_for("age"), Some("Age must be less than 120"));

        let huge = validate(NewStudent::new("A", 100_000, "B")).unwrap_err();
        assert_eq!(huge.message_for("age"), Some("Age must be less than 120"));
    }

    #[test]
    fn test_negative_age_rejected() {
        let err = validate(NewStudent::new("A", -5, "B")).unwrap_err();
        assert!(err.message_for("age").is_some());
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = validate(NewStudent::new("   ", 20, "Physics")).unwrap_err();
        assert_eq!(err.message_for("name"), Some("Student name is required"));
        assert_eq!(err.errors().len(), 1);
    }

    #[test]
    fn test_mixed_failures_keep_field_order() {
        let err = validate(NewStudent::new("", 0, "")).unwrap_err();
        let fields: Vec<_> = err.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "age", "course"]);
        assert_eq!(err.message_for("age"), Some("Age must be at least 1"));
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let err = validate(NewStudent::default()).unwrap_err();
        let fields: Vec<_> = err.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "age", "course"]);
        assert_eq!(err.message_for("age"), Some("Student age is required"));
        assert_eq!(err.message_for("course"), Some("Course is required"));
    }
}
