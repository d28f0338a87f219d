//! Student record types
//!
//! `Student` is the persisted shape. `NewStudent` and `StudentPatch` are the
//! request-side inputs; every field is optional at the type level so that a
//! missing field is reported by the validator with a readable message rather
//! than rejected by the deserializer.

use std::fmt;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned student identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(Uuid);

impl StudentId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from a path segment.
    ///
    /// Returns `None` for anything that is not a UUID.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Validated, trimmed student fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentFields {
    pub name: String,
    pub age: u8,
    pub course: String,
}

/// A persisted student record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub age: u8,
    pub course: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Build a new record with a fresh id and both timestamps set to now
    pub fn create(fields: StudentFields) -> Self {
        let now = now_millis();
        Self {
            id: StudentId::generate(),
            name: fields.name,
            age: fields.age,
            course: fields.course,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current field values
    pub fn fields(&self) -> StudentFields {
        StudentFields {
            name: self.name.clone(),
            age: self.age,
            course: self.course.clone(),
        }
    }

    /// Overwrite the fields and advance `updated_at`.
    ///
    /// `updated_at` always moves forward, by at least one millisecond.
    pub fn apply(&mut self, fields: StudentFields) {
        self.name = fields.name;
        self.age = fields.age;
        self.course = fields.course;
        self.updated_at = next_timestamp(self.updated_at);
    }
}

/// Create request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewStudent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub course: Option<String>,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, age: i64, course: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            age: Some(age),
            course: Some(course.into()),
        }
    }
}

/// Update request body: any subset of the student fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub course: Option<String>,
}

impl StudentPatch {
    /// Overlay the supplied fields on an existing record.
    ///
    /// The result still has to go through validation.
    pub fn merge_into(self, existing: &StudentFields) -> NewStudent {
        NewStudent {
            name: Some(self.name.unwrap_or_else(|| existing.name.clone())),
            age: Some(self.age.unwrap_or(i64::from(existing.age))),
            course: Some(self.course.unwrap_or_else(|| existing.course.clone())),
        }
    }
}

/// Wall clock at millisecond precision, the resolution timestamps are exposed at
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Next timestamp strictly after `previous`
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_millis();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> StudentFields {
        StudentFields {
            name: "Ada".to_string(),
            age: 20,
            course: "Mathematics".to_string(),
        }
    }

    #[test]
    fn test_student_id_parse() {
        let id = StudentId::generate();
        assert_eq!(StudentId::parse(&id.to_string()), Some(id));
        assert_eq!(StudentId::parse("not-an-id"), None);
        assert_eq!(StudentId::parse(""), None);
    }

    #[test]
    fn test_create_sets_timestamps() {
        let student = Student::create(fields());
        assert_eq!(student.created_at, student.updated_at);
        assert_eq!(student.name, "Ada");
    }

    #[test]
    fn test_apply_advances_updated_at() {
        let mut student = Student::create(fields());
        let before = student.updated_at;
        student.apply(fields());
        assert!(student.updated_at > before);
        assert_eq!(student.created_at, before);
    }

    #[test]
    fn test_next_timestamp_handles_future_previous() {
        let future = now_millis() + Duration::seconds(60);
        assert_eq!(next_timestamp(future), future + Duration::milliseconds(1));
    }

    #[test]
    fn test_json_shape() {
        let student = Student::create(fields());
        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["id"], student.id.to_string());
        assert_eq!(json["age"], 20);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_patch_merge_keeps_unset_fields() {
        let patch = StudentPatch {
            age: Some(25),
            ..Default::default()
        };
        let merged = patch.merge_into(&fields());
        assert_eq!(merged, NewStudent::new("Ada", 25, "Mathematics"));
    }
}
