//! Interception policies
//!
//! Every gRPC method exposed through the gateway has exactly one policy in
//! the table. The table is built at startup and only read afterwards.

use grpc_jwt_propagation::TokenKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authentication requirement attached to a gRPC method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterceptionPolicy {
    /// Explicitly public
    #[serde(rename = "none")]
    None,
    #[serde(rename = "access_token")]
    RequiresAccessToken,
    #[serde(rename = "refresh_token")]
    RequiresRefreshToken,
}

impl InterceptionPolicy {
    /// Token the policy asks for, `None` for public methods
    pub fn token_kind(self) -> Option<TokenKind> {
        match self {
            InterceptionPolicy::None => None,
            InterceptionPolicy::RequiresAccessToken => Some(TokenKind::Access),
            InterceptionPolicy::RequiresRefreshToken => Some(TokenKind::Refresh),
        }
    }
}

/// Mapping from fully-qualified gRPC method to its policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyTable {
    policies: HashMap<String, InterceptionPolicy>,
}

impl PolicyTable {
    pub fn get(&self, grpc_method: &str) -> Option<InterceptionPolicy> {
        self.policies.get(grpc_method).copied()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, InterceptionPolicy)> for PolicyTable {
    fn from_iter<I: IntoIterator<Item = (S, InterceptionPolicy)>>(iter: I) -> Self {
        Self {
            policies: iter
                .into_iter()
                .map(|(method, policy)| (method.into(), policy))
                .collect(),
        }
    }
}
