use crate::config::RunMode;
use crate::error::Failure;
use crate::exception::ExceptionFilter;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Message used when a failure has nothing to say for itself
pub const FALLBACK_MESSAGE: &str = "Something went wrong";

const FALLBACK_BODY: &str = r#"{"success":false,"message":"Something went wrong","status":500}"#;

/// Failure envelope: `{success: false, message, status, stack?}`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// The default exception filter
///
/// Domain failures keep their status code, anything else becomes a 500.
/// Stack traces are attached outside production only.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpExceptionFilter {
    mode: RunMode,
}

impl HttpExceptionFilter {
    pub fn new(mode: RunMode) -> Self {
        Self { mode }
    }

    pub fn render(&self, failure: &Failure) -> ErrorEnvelope {
        let stack = if self.mode.is_production() {
            None
        } else {
            Some(failure.trace())
        };

        ErrorEnvelope {
            success: false,
            message: failure
                .message()
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_owned()),
            status: failure.status().code(),
            stack,
        }
    }
}

impl ExceptionFilter for HttpExceptionFilter {
    fn catch(&self, failure: &Failure) -> Response {
        let status = failure.status();
        if status.is_server_error() {
            tracing::error!(status = status.code(), error = %failure, "Request failed");
        } else {
            tracing::debug!(status = status.code(), error = %failure, "Request rejected");
        }

        let envelope = self.render(failure);
        match serde_json::to_vec(&envelope) {
            Ok(body) => (
                StatusCode::from(status),
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize error envelope");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "application/json")],
                    FALLBACK_BODY,
                )
                    .into_response()
            }
        }
    }
}
