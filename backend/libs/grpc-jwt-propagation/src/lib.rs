//! JWT Credential Propagation from the HTTP gateway to gRPC backends
//!
//! ## Core Components
//!
//! - **JwtClaims**: claims decoded from a validated bearer token
//! - **RawToken**: the caller's token, kept in request extensions after authentication
//! - **JwtClientInterceptor**: injects `authorization: Bearer <token>` into gRPC metadata
//! - **outgoing_request / prepare_request**: turn an inbound HTTP request into
//!   an outbound tonic request carrying the caller's credentials
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use actix_web::{web, HttpRequest, HttpResponse};
//! use grpc_jwt_propagation::prepare_request;
//!
//! #[derive(Default, serde::Deserialize)]
//! struct GetUser {
//!     #[serde(default)]
//!     user_id: String,
//! }
//!
//! async fn get_user(req: HttpRequest, body: web::Bytes) -> HttpResponse {
//!     let request = match prepare_request::<GetUser>(&req, &body) {
//!         Ok(request) => request,
//!         Err(e) => return actix_web::ResponseError::error_response(&e),
//!     };
//!     // client.get_user(request.map(Into::into)).await
//!     HttpResponse::Ok().finish()
//! }
//! ```
//!
//! ## Guarantees
//!
//! - No token in the request = no authorization header (not an error)
//! - Empty body = default request message (not an error)
//! - Malformed body = 400

mod claims;
mod client;
mod context;

pub use claims::{JwtClaims, TokenKind};
pub use client::{JwtClientInterceptor, AUTHORIZATION_METADATA_KEY, BEARER_PREFIX};
pub use context::{outgoing_request, prepare_request, raw_token, RawToken};
