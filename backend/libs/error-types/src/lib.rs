//! Error types for the HTTP gateway
//!
//! This library owns everything that turns a failure into an HTTP response,
//! so that exactly one response is emitted per request:
//!
//! - `GatewayError`: failures raised inside the gateway itself (configuration,
//!   authentication, request binding)
//! - `grpc`: translation of backend gRPC status codes into HTTP status codes
//!   and JSON error bodies, with redaction in production
//! - `envelope`: response handler for handlers that produce either a
//!   precomputed response or a raw RPC error
//! - `validation`: request body binding
//!
//! # Design Principles
//!
//! 1. **Fail closed**: configuration gaps surface as 500, never as an open door
//! 2. **No leaks**: infrastructural messages are redacted in production
//! 3. **One body**: every translation yields a single `{"error": ...}` body

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

pub mod envelope;
pub mod grpc;
pub mod http;
pub mod mode;
pub mod validation;

// Re-export common types
pub use envelope::{Envelope, Payload, ResponseHandler};
pub use grpc::{translate_error, translate_status, Translation};
pub use http::{messages, ErrorResponse};
pub use mode::{DeploymentMode, ModeParseError};
pub use validation::{bind_json, BindError, ValidationHandler};

/// Failures raised by the gateway before or around the backend call
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The interception policy table was never configured
    #[error("missing gRPC interceptions")]
    MissingPolicyTable,

    /// The policy table has no entry for the RPC method behind a route
    #[error("missing interception policy for gRPC method {method}")]
    MissingMethodPolicy { method: String },

    /// Credentials were absent or rejected by the authentication step
    #[error("{0}")]
    Unauthenticated(String),

    /// Credentials were valid but do not grant access to the method
    #[error("{0}")]
    Forbidden(String),

    /// The request body could not be bound
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Anything else that must not reach the client verbatim
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Configuration errors are deployment bugs, not client mistakes
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingPolicyTable | Self::MissingMethodPolicy { .. }
        )
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Bind(_) => StatusCode::BAD_REQUEST,
            Self::MissingPolicyTable | Self::MissingMethodPolicy { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::Unauthenticated(message) | Self::Forbidden(message) => {
                ErrorResponse::new(message.as_str())
            }
            Self::Bind(err) => ErrorResponse::new(err.to_string()),
            // Internal details stay in the logs
            _ => ErrorResponse::new(messages::INTERNAL_SERVER_ERROR),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_map_to_500() {
        let missing_table = GatewayError::MissingPolicyTable;
        let missing_method = GatewayError::MissingMethodPolicy {
            method: "/users.v1.UserService/GetUser".to_string(),
        };

        assert_eq!(missing_table.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(missing_method.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(missing_table.is_configuration());
        assert!(missing_method.is_configuration());
    }

    #[test]
    fn test_unauthenticated_maps_to_401() {
        let error = GatewayError::unauthenticated("Missing authorization header");

        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        assert!(!error.is_configuration());
        assert_eq!(error.to_string(), "Missing authorization header");
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let error = GatewayError::forbidden("admin role required");

        assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
        assert!(!error.is_configuration());
    }

    #[test]
    fn test_bind_error_maps_to_400() {
        let source = serde_json::from_slice::<serde_json::Value>(b"{not json").unwrap_err();
        let error = GatewayError::from(BindError::from(source));

        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_method_does_not_leak_method_name() {
        let error = GatewayError::MissingMethodPolicy {
            method: "/internal.v1.Secret/Dump".to_string(),
        };

        let response = error.error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(body.error, "internal server error");
    }
}
