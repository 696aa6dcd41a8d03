//! JWT authenticator
//!
//! Validates the `Authorization: Bearer <token>` header of a request against
//! the token kind its policy requires.

use actix_web::dev::ServiceRequest;
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::HttpMessage;
use error_types::{GatewayError, GatewayResult};
use grpc_jwt_propagation::{JwtClaims, RawToken, TokenKind};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::authenticator::{AuthStep, Authenticator, PassThrough};
use crate::interception::InterceptionPolicy;

/// Builds token-validating steps sharing one key and validation setup
#[derive(Clone)]
pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(decoding_key: DecodingKey, validation: Validation) -> Self {
        Self {
            decoding_key,
            validation,
        }
    }

    /// HS256 with a shared secret
    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(
            DecodingKey::from_secret(secret),
            Validation::new(Algorithm::HS256),
        )
    }
}

impl Authenticator for JwtAuthenticator {
    fn build_step(&self, policy: InterceptionPolicy) -> Arc<dyn AuthStep> {
        match policy.token_kind() {
            Some(expected) => Arc::new(JwtStep {
                expected,
                decoding_key: self.decoding_key.clone(),
                validation: self.validation.clone(),
            }),
            None => Arc::new(PassThrough),
        }
    }
}

/// Step validating one kind of token
pub struct JwtStep {
    expected: TokenKind,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthStep for JwtStep {
    fn authenticate(&self, req: &ServiceRequest) -> GatewayResult<()> {
        let token = bearer_token(req.headers())?;

        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!(path = %req.path(), error = %e, "JWT validation failed");
                GatewayError::unauthenticated("Invalid token")
            })?;

        let claims = token_data.claims;
        if claims.token_type != self.expected {
            warn!(
                path = %req.path(),
                expected = %self.expected,
                actual = %claims.token_type,
                "Token type not accepted for this method"
            );
            return Err(GatewayError::unauthenticated("Invalid token type"));
        }

        debug!(sub = %claims.sub, token_type = %claims.token_type, "JWT validated successfully");

        let mut extensions = req.extensions_mut();
        extensions.insert(RawToken(token.to_string()));
        extensions.insert(claims);
        Ok(())
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> GatewayResult<&str> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| GatewayError::unauthenticated("Missing Authorization header"))?;

    let value = header
        .to_str()
        .map_err(|_| GatewayError::unauthenticated("Invalid Authorization header"))?;

    value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| GatewayError::unauthenticated("Authorization must use Bearer scheme"))
}
