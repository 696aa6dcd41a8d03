//! Outgoing call context
//!
//! Bridges an inbound actix-web request to an outbound tonic request: binds
//! the JSON body and forwards the caller's bearer token, if any.

use actix_web::{HttpMessage, HttpRequest};
use error_types::{bind_json, GatewayError, GatewayResult};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::JwtClientInterceptor;

/// Raw bearer token of an authenticated request
///
/// Stored in request extensions by the authentication step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken(pub String);

pub fn raw_token(req: &HttpRequest) -> Option<RawToken> {
    req.extensions().get::<RawToken>().cloned()
}

/// Wrap `message` in a tonic request carrying the caller's token
///
/// A request without a token is forwarded without an authorization header;
/// policy enforcement has already happened at this point.
pub fn outgoing_request<T>(req: &HttpRequest, message: T) -> GatewayResult<tonic::Request<T>> {
    let request = tonic::Request::new(message);

    let Some(RawToken(token)) = raw_token(req) else {
        debug!(path = %req.path(), "No token in request context");
        return Ok(request);
    };

    let interceptor = JwtClientInterceptor::new(&token)
        .map_err(|status| GatewayError::Internal(status.message().to_string()))?;

    Ok(interceptor.attach(request))
}

/// Bind the request body and build the outgoing request
///
/// An empty body yields `T::default()`.
pub fn prepare_request<T>(req: &HttpRequest, body: &[u8]) -> GatewayResult<tonic::Request<T>>
where
    T: DeserializeOwned + Default,
{
    let message = bind_json::<T>(body)?;
    outgoing_request(req, message)
}
