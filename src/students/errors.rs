//! Data access errors

use thiserror::Error;

use crate::schema::ValidationError;
use crate::storage::StoreError;

/// Result type for student operations
pub type StudentResult<T> = Result<T, StudentError>;

/// The three failure kinds of a student operation
#[derive(Debug, Error)]
pub enum StudentError {
    /// Input violates the student schema
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No record with that id, or the id is not well formed
    #[error("Student not found")]
    NotFound,

    /// The store failed
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl StudentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StudentError::NotFound)
    }
}
