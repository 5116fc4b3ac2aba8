//! HTTP routes
//!
//! Handlers return `ApiResponse` on success and `Failure` otherwise; they never
//! render errors themselves.

use crate::common::StatusCode;
use crate::error::{DomainError, Failure};
use axum::Router;
use axum::http::{Method, Uri};
use axum::routing::get;

pub mod health;

pub use health::{HealthPayload, health};

pub fn routes() -> Router {
    Router::new().route("/", get(health))
}

/// Fallback for unmatched paths
pub async fn not_found(uri: Uri) -> Failure {
    DomainError::not_found(format!("Route not found: {}", uri.path())).into()
}

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed(method: Method, uri: Uri) -> Failure {
    DomainError::with_status(
        format!("Method {} not allowed on {}", method, uri.path()),
        StatusCode::MethodNotAllowed,
    )
    .into()
}
