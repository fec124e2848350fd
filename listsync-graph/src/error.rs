//! Error types for the Graph transport.

use std::fmt;
use thiserror::Error;

/// Result type for Graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Classification of a non-2xx Graph response, named after the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    Conflict,
    Gone,
    LengthRequired,
    PreconditionFailed,
    RequestEntityTooLarge,
    UnsupportedMediaType,
    RequestedRangeNotSatisfiable,
    UnprocessableEntity,
    TooManyRequests,
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    InsufficientStorage,
    BandwidthLimitExceeded,
    /// Any status without a dedicated kind.
    Unknown,
}

impl ApiErrorKind {
    /// Maps an HTTP status code to its error kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            406 => Self::NotAcceptable,
            409 => Self::Conflict,
            410 => Self::Gone,
            411 => Self::LengthRequired,
            412 => Self::PreconditionFailed,
            413 => Self::RequestEntityTooLarge,
            415 => Self::UnsupportedMediaType,
            416 => Self::RequestedRangeNotSatisfiable,
            422 => Self::UnprocessableEntity,
            429 => Self::TooManyRequests,
            500 => Self::InternalServerError,
            501 => Self::NotImplemented,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            507 => Self::InsufficientStorage,
            509 => Self::BandwidthLimitExceeded,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Errors that can occur while talking to Microsoft Graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The remote API answered with a non-success status.
    #[error("{kind}: calling endpoint {endpoint} failed (HTTP {status}): {body}")]
    Api {
        kind: ApiErrorKind,
        status: u16,
        endpoint: String,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// More operations were handed to a single batch call than the API accepts.
    #[error("batch of {size} operations exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    /// The response was well-formed HTTP but not the shape we expected.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl GraphError {
    /// Builds an API error from a status code and raw body.
    pub fn api(status: u16, endpoint: impl Into<String>, body: impl Into<String>) -> Self {
        GraphError::Api {
            kind: ApiErrorKind::from_status(status),
            status,
            endpoint: endpoint.into(),
            body: body.into(),
        }
    }

    /// Returns the HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            GraphError::Api { status, .. } => Some(*status),
            GraphError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the error kind for API errors.
    pub fn kind(&self) -> Option<ApiErrorKind> {
        match self {
            GraphError::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns true if the remote resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ApiErrorKind::NotFound)
    }

    /// Returns the raw response body for API errors.
    pub fn body(&self) -> Option<&str> {
        match self {
            GraphError::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_statuses() {
        assert_eq!(ApiErrorKind::from_status(400), ApiErrorKind::BadRequest);
        assert_eq!(ApiErrorKind::from_status(404), ApiErrorKind::NotFound);
        assert_eq!(ApiErrorKind::from_status(429), ApiErrorKind::TooManyRequests);
        assert_eq!(ApiErrorKind::from_status(507), ApiErrorKind::InsufficientStorage);
    }

    #[test]
    fn unmapped_status_is_unknown() {
        assert_eq!(ApiErrorKind::from_status(418), ApiErrorKind::Unknown);
        assert_eq!(ApiErrorKind::from_status(599), ApiErrorKind::Unknown);
    }

    #[test]
    fn api_error_carries_body_and_status() {
        let err = GraphError::api(409, "/sites/x/lists", r#"{"error":"nameAlreadyExists"}"#);
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.kind(), Some(ApiErrorKind::Conflict));
        assert!(err.body().unwrap().contains("nameAlreadyExists"));
        assert!(!err.is_not_found());

        let msg = err.to_string();
        assert!(msg.starts_with("Conflict"));
        assert!(msg.contains("/sites/x/lists"));
    }
}
