//! Student schema
//!
//! Declares the shape of a student record and the constraints every
//! persisted record satisfies:
//!
//! - `name` and `course` are trimmed and non-empty
//! - `age` is an integer in [1, 120]
//! - `id`, `createdAt` and `updatedAt` are assigned by the data access layer,
//!   never taken from a request body

mod errors;
mod types;
mod validator;

pub use errors::{FieldError, SchemaResult, ValidationError};
pub use types::{
    next_timestamp, now_millis, NewStudent, Student, StudentFields, StudentId, StudentPatch,
};
pub use validator::{validate, MAX_AGE, MIN_AGE};
