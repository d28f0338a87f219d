//! Observability for studentdb
//!
//! Logging goes through `tracing`. Each HTTP request is logged by the
//! `TraceLayer` installed in the server; store failures are logged with
//! their error code where they are mapped to a response.
//!
//! # Usage
//!
//! ```ignore
//! use studentdb::observability::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig { level: "debug".into(), json: true });
//! tracing::info!(port = 3000, "listening");
//! ```

mod logger;

pub use logger::{env_filter, init_logging, LogConfig};
