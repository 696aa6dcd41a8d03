//! Request body binding
//!
//! A missing body is not an error: the request object keeps its defaults.
//! Anything else that fails to parse is a client error.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use thiserror::Error;

use crate::envelope::ResponseHandler;
use crate::grpc::find_status;
use crate::http::ErrorResponse;

#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid request body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Bind a JSON body, accepting an empty one or a literal `null`
pub fn bind_json<T>(body: &[u8]) -> Result<T, BindError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let bound: Option<T> = serde_json::from_slice(body)?;
    Ok(bound.unwrap_or_default())
}

/// Turns binding and validation failures into responses
#[derive(Debug, Clone, Copy)]
pub struct ValidationHandler {
    responses: ResponseHandler,
}

impl ValidationHandler {
    pub fn new(responses: ResponseHandler) -> Self {
        Self { responses }
    }

    /// Errors that wrap a gRPC status go through translation, the rest are 400
    pub fn handle_error(&self, error: &(dyn StdError + 'static)) -> HttpResponse {
        if let Some(status) = find_status(error) {
            return self.responses.handle_status(status);
        }

        tracing::debug!(error = %error, "Rejected request body");
        ErrorResponse::new(error.to_string()).respond(StatusCode::BAD_REQUEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::DeploymentMode;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct GetUserRequest {
        #[serde(default)]
        user_id: String,
    }

    #[test]
    fn test_empty_body_keeps_defaults() {
        let request: GetUserRequest = bind_json(b"").unwrap();
        assert_eq!(request, GetUserRequest::default());

        let request: GetUserRequest = bind_json(b"  \n").unwrap();
        assert_eq!(request, GetUserRequest::default());
    }

    #[test]
    fn test_null_body_keeps_defaults() {
        let request: GetUserRequest = bind_json(b"null").unwrap();
        assert_eq!(request, GetUserRequest::default());

        let request: GetUserRequest = bind_json(b" null\n").unwrap();
        assert_eq!(request, GetUserRequest::default());
    }

    #[test]
    fn test_valid_body_is_bound() {
        let request: GetUserRequest = bind_json(br#"{"user_id":"42"}"#).unwrap();
        assert_eq!(request.user_id, "42");
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        let result = bind_json::<GetUserRequest>(br#"{"user_id":"#);
        assert!(matches!(result, Err(BindError::Malformed(_))));
    }

    #[test]
    fn test_handler_maps_plain_errors_to_400() {
        let handler = ValidationHandler::new(ResponseHandler::new(DeploymentMode::Production));
        let error = bind_json::<GetUserRequest>(b"[").unwrap_err();

        assert_eq!(handler.handle_error(&error).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_handler_translates_status_errors() {
        let handler = ValidationHandler::new(ResponseHandler::new(DeploymentMode::Production));
        let status = tonic::Status::invalid_argument("user_id must be a uuid");

        assert_eq!(handler.handle_error(&status).status(), StatusCode::BAD_REQUEST);

        let status = tonic::Status::permission_denied("nope");
        assert_eq!(handler.handle_error(&status).status(), StatusCode::FORBIDDEN);
    }
}
