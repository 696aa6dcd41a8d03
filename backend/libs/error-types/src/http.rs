//! HTTP error response body
//!
//! Every error leaving the gateway has the shape `{"error": "<message>"}`.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

/// Generic messages used when the real one must not reach the client
pub mod messages {
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const UNAUTHENTICATED: &str = "unauthenticated";
    pub const IN_DEVELOPMENT: &str = "in development";
    pub const SERVICE_UNAVAILABLE: &str = "service unavailable";
    pub const INTERNAL_SERVER_ERROR: &str = "internal server error";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Build an HTTP response carrying this body
    pub fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// Plain 500 with the generic body
pub fn internal_server_error() -> HttpResponse {
    ErrorResponse::new(messages::INTERNAL_SERVER_ERROR).respond(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization() {
        let body = ErrorResponse::new("user 42 not found");

        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"user 42 not found"}"#);
    }

    #[test]
    fn test_internal_server_error_status() {
        let response = internal_server_error();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
