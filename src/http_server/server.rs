//! # HTTP Server
//!
//! Combines the root and student routers, installs the middleware stack and
//! owns the store handle for the lifetime of the process: the store is
//! opened before the server is built and closed after the last in-flight
//! request has drained.

use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::storage::DocumentStore;
use crate::students::StudentRepository;

use super::config::ServerConfig;
use super::root_routes::{handle_panic, root_routes, route_not_found};
use super::student_routes::{student_routes, StudentState};

/// Request bodies above this size are rejected
pub const BODY_LIMIT_BYTES: usize = 100 * 1024;

/// HTTP server for the student API
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
    store: Arc<dyn DocumentStore>,
}

impl HttpServer {
    /// Create a server over an already opened store
    pub fn new(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        let router = Self::build_router(&config, StudentRepository::new(store.clone()));
        Self {
            config,
            router,
            store,
        }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &ServerConfig, students: StudentRepository) -> Router {
        let student_state = Arc::new(StudentState::new(students));

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(root_routes())
            .nest("/api/students", student_routes(student_state))
            .fallback(route_not_found)
            .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(cors)
            .layer(CatchPanicLayer::custom(handle_panic))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Start serving until Ctrl+C or SIGTERM
    pub async fn start(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` resolves, then close the store
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "student API listening");
        tracing::info!("students endpoint: http://{}/api/students", addr);

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Err(e) = self.store.close() {
            tracing::error!(code = e.code(), error = %e, "failed to close store");
        }
        tracing::info!("server shutdown complete");

        result
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
