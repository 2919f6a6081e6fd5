//! Request-level error kinds
//!
//! Every failure the router can produce for a single request maps to exactly
//! one HTTP status code. Startup failures live in `config::ConfigError`.

use hyper::{Method, StatusCode};
use thiserror::Error;

/// Allowed methods for every non-API route kind
pub const SITE_ALLOW: &str = "GET, HEAD, OPTIONS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// No route, handler or asset matches the request
    #[error("not found")]
    NotFound,

    /// The request target or body could not be understood
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The path matched but the method did not
    #[error("method {method} not allowed")]
    MethodNotAllowed { method: Method, allow: String },

    /// Declared or streamed body exceeds `http.max_body_size`
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// A handler failed to produce its response
    #[error("internal error: {0}")]
    Internal(String),
}

impl RouterError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn method_not_allowed(method: &Method, allow: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            method: method.clone(),
            allow: allow.into(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value for the `Allow` header, only set for 405
    pub fn allow(&self) -> Option<&str> {
        match self {
            Self::MethodNotAllowed { allow, .. } => Some(allow),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RouterError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RouterError::bad_request("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RouterError::PayloadTooLarge { limit: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            RouterError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_allow_only_for_405() {
        let err = RouterError::method_not_allowed(&Method::DELETE, SITE_ALLOW);
        assert_eq!(err.allow(), Some(SITE_ALLOW));
        assert_eq!(err.to_string(), "method DELETE not allowed");
        assert_eq!(RouterError::NotFound.allow(), None);
    }
}
