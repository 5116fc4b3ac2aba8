//! Application server
//!
//! Ties the HTTP surface to the store:
//!
//! ```text
//! connect store ──► bind 0.0.0.0:PORT ──► serve ──► (signal | task failure)
//!                                                    │
//!        exit ◄── disconnect store ◄── drain in-flight requests
//! ```

use super::error::{Result, ServerError};
use super::shutdown::{ShutdownHandle, listen_for_signals};
use crate::config::AppConfig;
use crate::controller;
use crate::database::{DatabaseLifecycle, StoreConnector};
use crate::exception::{ExceptionLayer, HttpExceptionFilter};
use crate::interceptor::{InterceptorLayer, LoggingInterceptor, TimeoutInterceptor};
use axum::Router;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;

/// Build the HTTP surface
///
/// The exception layer is the outermost layer so every failure, including
/// timeouts raised by the interceptors, unmatched routes and methods, and
/// handler panics, is rendered by it.
pub fn build_router(config: &AppConfig) -> Router {
    let interceptors = InterceptorLayer::default()
        .with(LoggingInterceptor)
        .with(TimeoutInterceptor::new(config.request_timeout));

    controller::routes()
        .method_not_allowed_fallback(controller::method_not_allowed)
        .fallback(controller::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(ExceptionLayer::new(HttpExceptionFilter::new(config.mode)))
                .layer(interceptors),
        )
}

/// Owns the process-wide server state
///
/// # Example
///
/// ```rust,no_run
/// use basecamp::config::AppConfig;
/// use basecamp::database::MongoConnector;
/// use basecamp::lifecycle::{ApplicationServer, exit_status};
///
/// #[tokio::main]
/// async fn main() -> std::process::ExitCode {
///     let config = AppConfig::from_env().unwrap_or_default();
///     let outcome = ApplicationServer::new(config, MongoConnector::default()).run().await;
///     std::process::ExitCode::from(exit_status(&outcome))
/// }
/// ```
pub struct ApplicationServer<C: StoreConnector> {
    config: AppConfig,
    database: Arc<DatabaseLifecycle<C>>,
    shutdown: ShutdownHandle,
}

impl<C: StoreConnector> ApplicationServer<C> {
    pub fn new(config: AppConfig, connector: C) -> Self {
        Self {
            config,
            database: Arc::new(DatabaseLifecycle::new(connector)),
            shutdown: ShutdownHandle::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Arc<DatabaseLifecycle<C>> {
        &self.database
    }

    /// Handle for triggering shutdown from outside the server
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn router(&self) -> Router {
        build_router(&self.config)
    }

    /// Run until SIGINT or SIGTERM
    pub async fn run(self) -> Result<()> {
        let signals = listen_for_signals(self.shutdown.clone()).map_err(ServerError::Signals)?;
        let outcome = self.run_until_shutdown().await;
        signals.abort();

        match &outcome {
            Ok(()) => tracing::info!("Shutdown complete"),
            Err(err) => tracing::error!("Server stopped: {}", err),
        }
        outcome
    }

    /// Connect, bind the configured port and serve until the shutdown handle
    /// is triggered
    pub async fn run_until_shutdown(&self) -> Result<()> {
        self.database
            .connect(self.config.mongo_uri.as_deref())
            .await?;

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.config.port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.database.disconnect().await;
                return Err(ServerError::Bind { addr, source });
            }
        };

        self.serve(listener).await
    }

    /// Connect, then serve on an already bound listener
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        self.database
            .connect(self.config.mongo_uri.as_deref())
            .await?;
        self.serve(listener).await
    }

    /// Serve on a listener, then drain and disconnect the store
    async fn serve(&self, listener: TcpListener) -> Result<()> {
        if self.shutdown.is_triggered() {
            tracing::info!("Shutdown requested before the server started");
            self.database.disconnect().await;
            return Ok(());
        }

        let port = listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(self.config.port);
        tracing::info!("Server running on port {}", port);
        tracing::info!("Environment: {}", self.config.mode);

        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();
        let outcome = axum::serve(listener, app)
            .with_graceful_shutdown(self.shutdown.triggered())
            .await;

        match &outcome {
            Ok(()) => tracing::info!("HTTP server closed"),
            Err(err) => tracing::error!("HTTP server failed: {}", err),
        }

        self.database.disconnect().await;
        outcome.map_err(ServerError::Serve)
    }
}
