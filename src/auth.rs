//! Token verification in front of authenticated routes.

use async_trait::async_trait;
use std::collections;
use thiserror::Error;

/// The authenticated caller of a request.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Principal {
    /// Subject the token was issued to.
    pub subject: String,
}

/// Why a token was refused.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AuthorizationError {
    /// The token is unknown, expired or malformed.
    #[error("invalid token")]
    InvalidToken,
    /// The verifier could not be reached.
    #[error("authorizer unavailable: {0}")]
    Unavailable(String),
}

/// Verifies bearer tokens on behalf of the routes that require authorization.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Resolve a bearer token to its principal.
    async fn verify(&self, token: &str) -> Result<Principal, AuthorizationError>;
}

/// [`Authorizer`] over a fixed token table, for local hosting and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenAuthorizer {
    tokens: collections::HashMap<String, Principal>,
}

impl StaticTokenAuthorizer {
    /// Accept `token` as `subject`.
    pub fn with_token(mut self, token: impl Into<String>, subject: impl Into<String>) -> Self {
        let principal = Principal {
            subject: subject.into(),
        };
        self.tokens.insert(token.into(), principal);
        self
    }
}

#[async_trait]
impl Authorizer for StaticTokenAuthorizer {
    async fn verify(&self, token: &str) -> Result<Principal, AuthorizationError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthorizationError::InvalidToken)
    }
}
