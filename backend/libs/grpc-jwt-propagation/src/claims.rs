//! JWT Claims Structure
//!
//! Claims decoded from a validated bearer token. The gateway stores them in
//! request extensions so handlers can read the caller's identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of token carried in the `token_type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims extracted from validated tokens
///
/// - Fields are public for direct access (no getter boilerplate)
/// - Cloneable for storing in request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Token type: "access" or "refresh"
    pub token_type: TokenKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Unique token identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl JwtClaims {
    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenKind::Access
    }

    pub fn is_refresh_token(&self) -> bool {
        self.token_type == TokenKind::Refresh
    }
}
