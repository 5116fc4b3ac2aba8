use crate::interceptor::{Interceptor, InterceptorResult, Next};
use async_trait::async_trait;
use axum::{body::Body, http::Request};
use std::time::Instant;

/// An interceptor that logs request timing and status
#[derive(Clone, Default)]
pub struct LoggingInterceptor;

#[async_trait]
impl Interceptor for LoggingInterceptor {
    async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();
        let start = Instant::now();

        tracing::debug!(%method, %path, "--> request");

        let result = next.run(request).await;
        let latency_ms = start.elapsed().as_millis();
        match &result {
            Ok(response) => {
                tracing::info!(
                    %method,
                    %path,
                    status = response.status().as_u16(),
                    latency_ms,
                    "<-- response"
                );
            }
            Err(failure) => {
                tracing::warn!(
                    %method,
                    %path,
                    status = failure.status().code(),
                    latency_ms,
                    error = %failure,
                    "<-- failed"
                );
            }
        }
        result
    }
}
