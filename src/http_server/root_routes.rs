//! Root routes
//!
//! `GET /` describes the API. Unmatched routes and handler panics are
//! answered here as well.

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use super::errors::ApiError;

/// Routes served at the root
pub fn root_routes() -> Router {
    Router::new().route("/", get(index_handler).fallback(route_not_found))
}

/// Static description of the available endpoints
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "Student Management System API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "students": "/api/students",
            "createStudent": "POST /api/students",
            "getAllStudents": "GET /api/students",
            "getStudent": "GET /api/students/:id",
            "updateStudent": "PUT /api/students/:id",
            "deleteStudent": "DELETE /api/students/:id"
        }
    }))
}

/// 404 for anything no route claims
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Converts a handler panic into a 500 envelope
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    ApiError::Panic.into_response()
}
