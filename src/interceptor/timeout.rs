use crate::common::StatusCode;
use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::DomainError;
use crate::interceptor::{Interceptor, InterceptorResult, Next};
use async_trait::async_trait;
use axum::{body::Body, http::Request};
use std::time::Duration;

/// Aborts requests that run past a fixed deadline
///
/// The handler future is dropped when the deadline passes, which cancels that
/// request only; the client gets a `408 REQUEST_TIMEOUT` envelope.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutInterceptor {
    limit: Duration,
}

impl TimeoutInterceptor {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl Default for TimeoutInterceptor {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl Interceptor for TimeoutInterceptor {
    async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult {
        let path = request.uri().path().to_owned();
        match tokio::time::timeout(self.limit, next.run(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(%path, limit = ?self.limit, "Request exceeded its deadline");
                Err(DomainError::with_status(
                    format!("Request timed out after {:?}", self.limit),
                    StatusCode::RequestTimeout,
                )
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::InterceptorLayer;
    use axum::response::IntoResponse;
    use std::convert::Infallible;
    use tower::{Layer, ServiceExt, service_fn};

    async fn call_with_delay(delay: Duration) -> InterceptorResult {
        let service = InterceptorLayer::default()
            .with(TimeoutInterceptor::new(Duration::from_millis(50)))
            .layer(service_fn(move |_req| async move {
                tokio::time::sleep(delay).await;
                Ok::<_, Infallible>("done".into_response())
            }));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        service.oneshot(request).await
    }

    #[tokio::test]
    async fn test_fast_request_passes() {
        let response = call_with_delay(Duration::ZERO).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let failure = call_with_delay(Duration::from_secs(30)).await.unwrap_err();
        assert_eq!(failure.status(), StatusCode::RequestTimeout);
        assert!(failure.message().unwrap().contains("timed out"));
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(
            TimeoutInterceptor::default().limit(),
            Duration::from_secs(15)
        );
    }
}
