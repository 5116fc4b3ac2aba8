use crate::error::Failure;
use crate::interceptor::{Interceptor, InterceptorResult, Next};
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer for invoking a chain of Interceptors
///
/// Interceptors run in the order they were added: the first one sees the
/// request first and the response last.
#[derive(Clone, Default)]
pub struct InterceptorLayer {
    interceptors: Arc<Vec<Arc<dyn Interceptor>>>,
}

impl InterceptorLayer {
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            interceptors: Arc::new(interceptors),
        }
    }

    /// Append an interceptor to the end of the chain
    pub fn with(self, interceptor: impl Interceptor) -> Self {
        let mut interceptors = Vec::clone(&self.interceptors);
        interceptors.push(Arc::new(interceptor));
        Self::new(interceptors)
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl<S> Layer<S> for InterceptorLayer {
    type Service = InterceptorMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptorMiddleware {
            inner,
            interceptors: Arc::clone(&self.interceptors),
        }
    }
}

#[derive(Clone)]
pub struct InterceptorMiddleware<S> {
    inner: S,
    interceptors: Arc<Vec<Arc<dyn Interceptor>>>,
}

impl<S> Service<Request<Body>> for InterceptorMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<Failure>,
{
    type Response = Response;
    type Error = Failure;
    type Future = Pin<Box<dyn Future<Output = InterceptorResult> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // keep the service that was driven to readiness, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let mut chain = Next::new(move |req| {
            Box::pin(async move { inner.call(req).await.map_err(Into::into) })
        });

        // wrap from the innermost outwards so interceptors[0] runs first
        for interceptor in self.interceptors.iter().rev().cloned() {
            let next = chain;
            chain = Next::new(move |req| {
                Box::pin(async move { interceptor.intercept(req, next).await })
            });
        }

        Box::pin(chain.run(request))
    }
}
