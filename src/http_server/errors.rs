//! # HTTP Errors
//!
//! Maps data access failures onto status codes. The mapping depends on the
//! operation: a store failure during a write is reported as 400, during a
//! read or delete as 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::students::StudentError;

use super::extract::BodyRejection;
use super::response::ErrorResponse;

/// Detail shown to clients in place of store internals
pub const STORE_ERROR_DETAIL: &str = "Internal storage error";

/// The operation a handler was performing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    List,
    Get,
    Update,
    Delete,
}

impl Operation {
    /// Message used when the operation fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Create => "Error creating student",
            Operation::List => "Error fetching students",
            Operation::Get => "Error fetching student",
            Operation::Update => "Error updating student",
            Operation::Delete => "Error deleting student",
        }
    }

    /// Create and Update report every non-404 failure as a bad request
    pub fn is_write(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

/// HTTP API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 404 for a student id
    #[error("Student not found")]
    StudentNotFound,

    /// 404 for an unknown route
    #[error("Route not found")]
    RouteNotFound,

    /// 400 with detail
    #[error("{message}: {detail}")]
    BadRequest {
        message: &'static str,
        detail: String,
    },

    /// 500 with detail
    #[error("{message}: {detail}")]
    Internal {
        message: &'static str,
        detail: String,
    },

    /// A body the server refused to read, answered with its own status
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// 500 from a handler panic
    #[error("Internal Server Error")]
    Panic,
}

impl ApiError {
    /// Map a data access failure for the given operation.
    ///
    /// Store failures are logged here and never shown to the client verbatim.
    pub fn from_student_error(operation: Operation, err: StudentError) -> Self {
        let detail = match err {
            StudentError::NotFound => return ApiError::StudentNotFound,
            StudentError::Validation(e) => e.to_string(),
            StudentError::Store(e) => {
                tracing::error!(
                    ?operation,
                    code = e.code(),
                    error = %e,
                    "store operation failed"
                );
                STORE_ERROR_DETAIL.to_string()
            }
        };
        Self::failed(operation, detail)
    }

    /// A request body that could not be read or parsed.
    ///
    /// Malformed content fails the operation with 400. Anything else, such
    /// as an oversized body, keeps the status it was rejected with.
    pub fn invalid_body(operation: Operation, rejection: BodyRejection) -> Self {
        if rejection.is_malformed() {
            Self::BadRequest {
                message: operation.failure_message(),
                detail: rejection.message,
            }
        } else {
            Self::Rejected {
                status: rejection.status,
                message: rejection.message,
            }
        }
    }

    fn failed(operation: Operation, detail: String) -> Self {
        let message = operation.failure_message();
        if operation.is_write() {
            Self::BadRequest { message, detail }
        } else {
            Self::Internal { message, detail }
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::StudentNotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } | ApiError::Panic => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected { status, .. } => *status,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::BadRequest { message, detail } | ApiError::Internal { message, detail } => {
                ErrorResponse::with_detail(*message, detail.clone())
            }
            other => ErrorResponse::new(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
