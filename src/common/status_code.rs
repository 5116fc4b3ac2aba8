use axum::http::StatusCode as HttpStatusCode;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Symbolic HTTP status codes used across the service.
///
/// The catalog is closed: every code the service can emit is listed here,
/// and the `Display`/`FromStr` forms are the upper snake case names
/// (`"INTERNAL_ERROR"`, `"NOT_FOUND"`, ...).
///
/// # Example
/// ```
/// use basecamp::common::StatusCode;
///
/// assert_eq!(StatusCode::NotFound.code(), 404);
/// assert_eq!(StatusCode::from_name("INTERNAL_ERROR"), Some(StatusCode::InternalError));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    // 2xx
    Ok,
    Created,
    NoContent,

    // 4xx
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    RequestTimeout,
    Conflict,
    UnprocessableEntity,
    TooManyRequests,

    // 5xx
    InternalError,
    NotImplemented,
    ServiceUnavailable,
}

impl StatusCode {
    /// Numeric HTTP status code
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::RequestTimeout => 408,
            Self::Conflict => 409,
            Self::UnprocessableEntity => 422,
            Self::TooManyRequests => 429,
            Self::InternalError => 500,
            Self::NotImplemented => 501,
            Self::ServiceUnavailable => 503,
        }
    }

    /// Symbolic name, e.g. `"UNPROCESSABLE_ENTITY"`
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Look up an entry by its symbolic name
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Look up an entry by its numeric code
    pub fn from_code(code: u16) -> Option<Self> {
        Self::iter().find(|status| status.code() == code)
    }

    /// Every entry of the catalog, in declaration order
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub const fn is_server_error(self) -> bool {
        self.code() >= 500
    }
}

impl From<StatusCode> for HttpStatusCode {
    fn from(status: StatusCode) -> Self {
        HttpStatusCode::from_u16(status.code()).unwrap_or(HttpStatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_codes() {
        let expected = [
            ("OK", 200),
            ("CREATED", 201),
            ("NO_CONTENT", 204),
            ("BAD_REQUEST", 400),
            ("UNAUTHORIZED", 401),
            ("FORBIDDEN", 403),
            ("NOT_FOUND", 404),
            ("METHOD_NOT_ALLOWED", 405),
            ("REQUEST_TIMEOUT", 408),
            ("CONFLICT", 409),
            ("UNPROCESSABLE_ENTITY", 422),
            ("TOO_MANY_REQUESTS", 429),
            ("INTERNAL_ERROR", 500),
            ("NOT_IMPLEMENTED", 501),
            ("SERVICE_UNAVAILABLE", 503),
        ];

        assert_eq!(StatusCode::all().count(), expected.len());
        for (name, code) in expected {
            let status = StatusCode::from_name(name).unwrap();
            assert_eq!(status.code(), code, "{name}");
            assert_eq!(status.name(), name);
        }
    }

    #[test]
    fn test_lookup_is_deterministic() {
        for status in StatusCode::all() {
            let first = status.code();
            for _ in 0..3 {
                assert_eq!(StatusCode::from_name(status.name()).unwrap().code(), first);
            }
        }
    }

    #[test]
    fn test_unknown_name_and_code() {
        assert_eq!(StatusCode::from_name("TEAPOT"), None);
        assert_eq!(StatusCode::from_name("not_found"), None);
        assert_eq!(StatusCode::from_code(418), None);
        assert_eq!(StatusCode::from_code(422), Some(StatusCode::UnprocessableEntity));
    }

    #[test]
    fn test_http_conversion() {
        assert_eq!(HttpStatusCode::from(StatusCode::Ok), HttpStatusCode::OK);
        assert_eq!(
            HttpStatusCode::from(StatusCode::InternalError),
            HttpStatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(StatusCode::ServiceUnavailable.is_server_error());
        assert!(!StatusCode::Conflict.is_server_error());
    }
}
