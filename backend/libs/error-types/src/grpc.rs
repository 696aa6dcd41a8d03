//! gRPC status translation
//!
//! Maps a backend gRPC outcome onto an HTTP status code and a JSON error body.
//!
//! | gRPC code        | HTTP | Production body         |
//! |------------------|------|-------------------------|
//! | AlreadyExists    | 409  | original message        |
//! | NotFound         | 404  | original message        |
//! | InvalidArgument  | 400  | original message        |
//! | PermissionDenied | 403  | "unauthorized"          |
//! | Unauthenticated  | 401  | "unauthenticated"       |
//! | Unimplemented    | 501  | "in development"        |
//! | Unavailable      | 503  | "service unavailable"   |
//! | anything else    | 500  | "internal server error" |
//!
//! In development every row carries the original message.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use std::error::Error as StdError;
use tonic::{Code, Status};

use crate::http::{messages, ErrorResponse};
use crate::mode::DeploymentMode;

/// HTTP status and body produced for one RPC outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl Translation {
    pub fn into_response(self) -> HttpResponse {
        self.body.respond(self.status)
    }
}

/// One row of the mapping table
struct Row {
    status: StatusCode,
    /// Replacement message in production, `None` for pass-through rows
    redacted: Option<&'static str>,
}

impl Row {
    const fn verbatim(status: StatusCode) -> Self {
        Self {
            status,
            redacted: None,
        }
    }

    const fn redacted(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            redacted: Some(message),
        }
    }
}

fn row_for(code: Option<Code>) -> Row {
    match code {
        Some(Code::AlreadyExists) => Row::verbatim(StatusCode::CONFLICT),
        Some(Code::NotFound) => Row::verbatim(StatusCode::NOT_FOUND),
        Some(Code::InvalidArgument) => Row::verbatim(StatusCode::BAD_REQUEST),
        Some(Code::PermissionDenied) => Row::redacted(StatusCode::FORBIDDEN, messages::UNAUTHORIZED),
        Some(Code::Unauthenticated) => {
            Row::redacted(StatusCode::UNAUTHORIZED, messages::UNAUTHENTICATED)
        }
        Some(Code::Unimplemented) => {
            Row::redacted(StatusCode::NOT_IMPLEMENTED, messages::IN_DEVELOPMENT)
        }
        Some(Code::Unavailable) => {
            Row::redacted(StatusCode::SERVICE_UNAVAILABLE, messages::SERVICE_UNAVAILABLE)
        }
        _ => Row::redacted(
            StatusCode::INTERNAL_SERVER_ERROR,
            messages::INTERNAL_SERVER_ERROR,
        ),
    }
}

fn translate(mode: DeploymentMode, code: Option<Code>, message: &str) -> Translation {
    let row = row_for(code);

    let body = match row.redacted {
        Some(generic) if mode.is_production() => ErrorResponse::new(generic),
        _ => ErrorResponse::new(message),
    };

    log_translation(code, row.status, message);

    Translation {
        status: row.status,
        body,
    }
}

fn log_translation(code: Option<Code>, status: StatusCode, message: &str) {
    let http_status = status.as_u16();
    match code {
        Some(Code::InvalidArgument | Code::NotFound | Code::AlreadyExists) => {
            tracing::debug!(code = ?code, http_status, message = %message, "Client error");
        }
        Some(Code::Unauthenticated | Code::PermissionDenied) => {
            tracing::warn!(code = ?code, http_status, message = %message, "Auth error");
        }
        _ => {
            tracing::error!(code = ?code, http_status, message = %message, "Internal error");
        }
    }
}

/// Translate a gRPC status returned by a backend call
pub fn translate_status(mode: DeploymentMode, status: &Status) -> Translation {
    translate(mode, Some(status.code()), status.message())
}

/// Translate any error that may wrap a gRPC status
///
/// Errors without a status anywhere in their source chain (transport
/// failures, timeouts, ...) fall into the catch-all row.
pub fn translate_error(mode: DeploymentMode, error: &(dyn StdError + 'static)) -> Translation {
    match find_status(error) {
        Some(status) => translate_status(mode, status),
        None => translate(mode, None, &error.to_string()),
    }
}

/// Walk the source chain looking for a `tonic::Status`
pub fn find_status<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a Status> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(status) = err.downcast_ref::<Status>() {
            return Some(status);
        }
        current = err.source();
    }
    None
}
