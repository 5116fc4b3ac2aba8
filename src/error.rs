use crate::common::StatusCode;
use crate::database::StoreError;
use crate::exception::CaughtFailure;
use axum::response::{IntoResponse, Response};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::convert::Infallible;
use std::panic::Location;
use std::sync::Arc;
use thiserror::Error;

/// A failure raised on purpose by application code
///
/// Carries a user-facing message and the HTTP status to answer with. The
/// origin trace is recorded where the error is built and is only ever shown
/// outside production.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DomainError {
    message: String,
    status: StatusCode,
    trace: String,
}

impl DomainError {
    /// A domain error answered with `500 INTERNAL_ERROR`
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::InternalError)
    }

    #[track_caller]
    pub fn with_status(message: impl Into<String>, status: StatusCode) -> Self {
        let message = message.into();
        let trace = origin_trace(&message, Location::caller());
        Self {
            message,
            status,
            trace,
        }
    }

    #[track_caller]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::BadRequest)
    }

    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::NotFound)
    }

    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_status(message, StatusCode::Conflict)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Where the error was raised; diagnostic only
    pub fn trace(&self) -> &str {
        &self.trace
    }
}

fn origin_trace(message: &str, location: &Location<'_>) -> String {
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => {
            format!("DomainError: {message}\n    at {location}\n{backtrace}")
        }
        _ => format!("DomainError: {message}\n    at {location}"),
    }
}

/// Anything a request handler can fail with
///
/// The variant is the discriminant the error middleware matches on:
/// classified failures keep their own status, everything else is a 500.
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl Failure {
    pub fn status(&self) -> StatusCode {
        match self {
            Failure::Domain(err) => err.status(),
            Failure::Unclassified(_) => StatusCode::InternalError,
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, Failure::Domain(_))
    }

    /// The failure's own message, `None` when it is blank
    pub fn message(&self) -> Option<String> {
        let message = match self {
            Failure::Domain(err) => err.message().to_owned(),
            Failure::Unclassified(err) => err.to_string(),
        };
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }

    /// Diagnostic trace for development responses
    pub fn trace(&self) -> String {
        match self {
            Failure::Domain(err) => err.trace().to_owned(),
            Failure::Unclassified(err) => format!("{err:?}"),
        }
    }
}

impl From<Infallible> for Failure {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        Failure::Unclassified(anyhow::Error::new(err))
    }
}

impl IntoResponse for Failure {
    /// Hands the failure to the exception layer
    ///
    /// The body is left empty; [`crate::exception::ExceptionLayer`] picks the
    /// failure out of the response extensions and renders the envelope.
    fn into_response(self) -> Response {
        let mut response = axum::http::StatusCode::from(self.status()).into_response();
        response
            .extensions_mut()
            .insert(CaughtFailure::new(Arc::new(self)));
        response
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        Failure::from(self).into_response()
    }
}
