//! Response envelopes
//!
//! Handlers either already know the HTTP status they want (`Envelope` with a
//! code) or hold a raw backend error that still has to be translated. The
//! `ResponseHandler` decides which path applies and emits exactly one response.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use std::error::Error as StdError;

use crate::grpc::{translate_error, translate_status};
use crate::http::{internal_server_error, ErrorResponse};
use crate::mode::DeploymentMode;

/// Body carried by an envelope
#[derive(Debug)]
pub enum Payload {
    Json(serde_json::Value),
    Error(Box<dyn StdError + Send + Sync>),
}

/// A response that may already carry its HTTP status
#[derive(Debug)]
pub struct Envelope {
    pub code: Option<StatusCode>,
    pub data: Payload,
}

impl Envelope {
    pub fn new(code: StatusCode, data: serde_json::Value) -> Self {
        Self {
            code: Some(code),
            data: Payload::Json(data),
        }
    }

    pub fn json<T: Serialize>(code: StatusCode, data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(code, serde_json::to_value(data)?))
    }

    /// Error envelope without a code; the status is derived by translation
    pub fn error(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            code: None,
            data: Payload::Error(error.into()),
        }
    }

    /// Error envelope whose status was decided by the caller
    pub fn error_with_code(
        code: StatusCode,
        error: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            code: Some(code),
            data: Payload::Error(error.into()),
        }
    }
}

fn emit(code: StatusCode, data: Payload) -> HttpResponse {
    match data {
        Payload::Json(value) => HttpResponse::build(code).json(value),
        Payload::Error(error) => ErrorResponse::new(error.to_string()).respond(code),
    }
}

/// Emits success and error envelopes according to the deployment mode
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseHandler {
    mode: DeploymentMode,
}

impl ResponseHandler {
    pub fn new(mode: DeploymentMode) -> Self {
        Self { mode }
    }

    /// A success envelope must carry its own code
    pub fn handle_success(&self, response: Option<Envelope>) -> HttpResponse {
        match response {
            Some(Envelope {
                code: Some(code),
                data,
            }) => emit(code, data),
            _ => {
                tracing::error!("Success response without status code");
                internal_server_error()
            }
        }
    }

    /// Precomputed error envelopes are emitted as-is; the rest are translated
    pub fn handle_error(&self, response: Option<Envelope>) -> HttpResponse {
        let Some(response) = response else {
            tracing::error!("Missing error response");
            return internal_server_error();
        };

        if let Some(code) = response.code {
            return emit(code, response.data);
        }

        match response.data {
            Payload::Error(error) => {
                let error: &(dyn StdError + 'static) = &*error;
                translate_error(self.mode, error).into_response()
            }
            Payload::Json(_) => {
                tracing::error!("Error response without status code or error value");
                internal_server_error()
            }
        }
    }

    /// The error envelope wins whenever it is present
    pub fn handle_error_prone(
        &self,
        success: Option<Envelope>,
        error: Option<Envelope>,
    ) -> HttpResponse {
        if error.is_some() {
            return self.handle_error(error);
        }
        self.handle_success(success)
    }

    /// Emit a backend result directly
    pub fn handle_result<T, E>(&self, result: Result<T, E>, success: StatusCode) -> HttpResponse
    where
        T: Serialize,
        E: StdError + 'static,
    {
        match result {
            Ok(data) => match Envelope::json(success, &data) {
                Ok(envelope) => self.handle_success(Some(envelope)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize response body");
                    internal_server_error()
                }
            },
            Err(error) => translate_error(self.mode, &error).into_response(),
        }
    }

    pub fn handle_status(&self, status: &tonic::Status) -> HttpResponse {
        translate_status(self.mode, status).into_response()
    }
}
