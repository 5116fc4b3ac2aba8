use crate::error::Failure;
use axum::{body::Body, http::Request, response::Response};
use futures::FutureExt;
use std::any::Any;
use std::convert::Infallible;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

pub mod http;

pub use http::HttpExceptionFilter;

/// The ExceptionFilter trait
///
/// Filters turn a failure raised during request processing into the response
/// sent back to the client. They must always produce a response.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch a failure and return a response
    fn catch(&self, failure: &Failure) -> Response;
}

/// A failure parked in the response extensions by [`Failure`]'s
/// `IntoResponse`, waiting for the [`ExceptionLayer`] to render it.
#[derive(Clone)]
pub struct CaughtFailure(Arc<Failure>);

impl CaughtFailure {
    pub(crate) fn new(failure: Arc<Failure>) -> Self {
        Self(failure)
    }

    pub fn failure(&self) -> &Failure {
        &self.0
    }
}

/// Tower Layer installing the terminal failure handler
///
/// Must be the outermost layer of the router: every failure returned by a
/// handler, by an interceptor or by the inner service ends up here, and the
/// layer never lets an error escape.
#[derive(Clone)]
pub struct ExceptionLayer {
    filter: Arc<dyn ExceptionFilter>,
}

impl ExceptionLayer {
    pub fn new(filter: impl ExceptionFilter) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }
}

impl<S> Layer<S> for ExceptionLayer {
    type Service = ExceptionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionMiddleware {
            inner,
            filter: Arc::clone(&self.filter),
        }
    }
}

#[derive(Clone)]
pub struct ExceptionMiddleware<S> {
    inner: S,
    filter: Arc<dyn ExceptionFilter>,
}

impl<S> Service<Request<Body>> for ExceptionMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<Failure> + Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // readiness of the inner service is awaited in `call` so its errors
        // can be rendered like any other failure
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let filter = Arc::clone(&self.filter);
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let outcome = match AssertUnwindSafe(inner.oneshot(request)).catch_unwind().await {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(err)) => Err(err.into()),
                Err(panic) => Err(Failure::Unclassified(anyhow::Error::msg(panic_message(
                    panic.as_ref(),
                )))),
            };

            let response = match outcome {
                Ok(mut response) => match response.extensions_mut().remove::<CaughtFailure>() {
                    Some(caught) => filter.catch(caught.failure()),
                    None => response,
                },
                Err(failure) => filter.catch(&failure),
            };
            Ok(response)
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "request handler panicked".to_owned()
    }
}
