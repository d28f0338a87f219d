//! studentdb - student records over HTTP, backed by an embedded document store

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod schema;
pub mod storage;
pub mod students;
