//! Student data access layer
//!
//! Create, list, fetch, update and delete student records against a
//! `DocumentStore`. Each operation is one store call on one document.

mod errors;
mod repository;

pub use errors::{StudentError, StudentResult};
pub use repository::{StudentRepository, COLLECTION};
