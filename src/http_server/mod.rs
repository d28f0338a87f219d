//! # Student API HTTP Server
//!
//! Axum server exposing student CRUD over JSON.
//!
//! # Endpoints
//!
//! - `/` - API description
//! - `/api/students` - create and list
//! - `/api/students/:id` - fetch, update, delete
//!
//! Anything else answers 404 `{"success": false, "message": "Route not found"}`.

pub mod config;
pub mod errors;
pub mod extract;
pub mod response;
pub mod root_routes;
pub mod server;
pub mod student_routes;

pub use config::{ConfigError, ServerConfig};
pub use errors::{ApiError, Operation};
pub use server::HttpServer;
