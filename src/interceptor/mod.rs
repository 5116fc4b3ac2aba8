use crate::error::Failure;
use async_trait::async_trait;
use axum::{body::Body, http::Request};
use std::future::Future;
use std::pin::Pin;

pub mod layer;
pub mod logging;
pub mod timeout;

pub use layer::InterceptorLayer;
pub use logging::LoggingInterceptor;
pub use timeout::TimeoutInterceptor;

/// standard return type for Interceptors
pub type InterceptorResult = Result<axum::response::Response, Failure>;

type NextFuture = Pin<Box<dyn Future<Output = InterceptorResult> + Send>>;

/// Represents the next handler in the chain
pub struct Next {
    run: Box<dyn FnOnce(Request<Body>) -> NextFuture + Send>,
}

impl Next {
    /// Create a new Next handler
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Request<Body>) -> NextFuture + Send + 'static,
    {
        Self { run: Box::new(f) }
    }

    /// Execute the next handler
    pub async fn run(self, request: Request<Body>) -> InterceptorResult {
        (self.run)(request).await
    }
}

/// The Interceptor trait
///
/// Interceptors can inspect the request before it reaches the handler and the
/// response (or failure) after it returns. Returning `Err` short-circuits the
/// chain; the failure is rendered by the exception layer.
///
/// # Example
/// ```
/// use basecamp::interceptor::{Interceptor, InterceptorResult, Next};
/// use async_trait::async_trait;
/// use axum::{body::Body, http::Request};
///
/// struct Noop;
///
/// #[async_trait]
/// impl Interceptor for Noop {
///     async fn intercept(&self, req: Request<Body>, next: Next) -> InterceptorResult {
///         next.run(req).await
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult;
}
