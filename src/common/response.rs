use crate::common::StatusCode;
use axum::{
    Json,
    http::StatusCode as HttpStatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Message used when a handler does not provide one
pub const DEFAULT_MESSAGE: &str = "Success";

/// Standard success envelope
///
/// Every successful endpoint answers with
/// `{success: true, message, data, status}`; `data` is left out of the JSON
/// when there is nothing to return. Failures never go through this type, see
/// [`crate::exception`].
///
/// # Example
/// ```
/// use basecamp::common::{ApiResponse, StatusCode};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Created {
///     id: String,
/// }
///
/// async fn create() -> ApiResponse<Created> {
///     ApiResponse::send(StatusCode::Created, "User created", Some(Created { id: "1".into() }))
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    pub status: u16,

    #[serde(skip)]
    http_status: HttpStatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Build an envelope with an explicit status, message and optional payload
    pub fn send(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            status: status.code(),
            http_status: status.into(),
        }
    }

    /// `200 OK` with the default message
    pub fn success(data: T) -> Self {
        Self::send(StatusCode::Ok, DEFAULT_MESSAGE, Some(data))
    }

    pub fn http_status(&self) -> HttpStatusCode {
        self.http_status
    }
}

impl<T: Serialize> Default for ApiResponse<T> {
    fn default() -> Self {
        Self::send(StatusCode::Ok, DEFAULT_MESSAGE, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}
