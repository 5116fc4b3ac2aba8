//! # Basecamp
//!
//! A minimal backend service skeleton on axum and MongoDB: one health route,
//! a uniform JSON response envelope, a terminal error layer and a store
//! connection whose lifecycle is tied to the server's.
//!
//! ## Features
//!
//! - **Response envelope**: `{success, message, data, status}` through [`ApiResponse`]
//! - **Status catalog**: named status codes in [`common::StatusCode`]
//! - **Failure rendering**: handlers return [`Failure`]; the [`exception`] layer
//!   turns it into `{success: false, message, status, stack?}`
//! - **Interceptors**: per-request logging and deadline around every route
//! - **Store lifecycle**: fail-fast connect, idempotent disconnect
//! - **Graceful shutdown**: SIGINT/SIGTERM drain requests, then close the store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use basecamp::prelude::*;
//! use basecamp::database::MongoConnector;
//!
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     let config = match AppConfig::from_env() {
//!         Ok(config) => config,
//!         Err(_) => return std::process::ExitCode::FAILURE,
//!     };
//!
//!     let outcome = ApplicationServer::new(config, MongoConnector::default())
//!         .run()
//!         .await;
//!     std::process::ExitCode::from(exit_status(&outcome))
//! }
//! ```

pub mod common;
pub mod config;
pub mod controller;
pub mod database;
pub mod error;
pub mod exception;
pub mod interceptor;
pub mod lifecycle;
pub mod models;
pub mod pipe;

// Re-export core types
pub use common::ApiResponse;
pub use config::AppConfig;
pub use error::{DomainError, Failure};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use basecamp::prelude::*;
/// ```
pub mod prelude {
    pub use crate::common::{ApiResponse, StatusCode};
    pub use crate::config::{AppConfig, ConfigService, RunMode};
    pub use crate::database::{DatabaseLifecycle, StoreConnector, StoreHandle};
    pub use crate::error::{DomainError, Failure};
    pub use crate::exception::{ExceptionFilter, ExceptionLayer, HttpExceptionFilter};
    pub use crate::interceptor::{Interceptor, InterceptorLayer, InterceptorResult, Next};
    pub use crate::lifecycle::{
        ApplicationServer, ShutdownHandle, ShutdownReason, build_router, exit_status,
        spawn_supervised,
    };
    pub use crate::pipe::builtins::*;
    pub use crate::pipe::{Pipe, PipeError, PipeResult};
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
