//! Credential supplier contract.
//!
//! The identity system is an external collaborator: on demand it yields a
//! short-lived bearer token for a fixed audience, or fails when there is no
//! active identity. Tokens are never cached here; the controller re-resolves
//! on every submission so rotation and expiry are tolerated for free.

use std::fmt;

use futures_util::future::BoxFuture;

/// Failure to produce a bearer token (no active identity, expired session).
///
/// This is a gating condition for submissions, not a runtime error: the
/// controller refuses the submission silently and nothing is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialError {
    pub message: String,
}

impl CredentialError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CredentialError {}

/// Supplies bearer tokens for the answering service.
///
/// Implementations wrap the identity provider's SDK. Called once per
/// submission; no caching obligation on either side.
pub trait CredentialSupplier: Send + Sync {
    /// Resolves a bearer token for the given audience.
    fn bearer_token(&self, audience: &str) -> BoxFuture<'_, Result<String, CredentialError>>;
}

/// Fixed-token supplier for tests and local development shells.
#[derive(Debug, Clone)]
pub struct StaticTokenSupplier {
    token: String,
}

impl StaticTokenSupplier {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl CredentialSupplier for StaticTokenSupplier {
    fn bearer_token(&self, _audience: &str) -> BoxFuture<'_, Result<String, CredentialError>> {
        let token = self.token.clone();
        Box::pin(async move { Ok(token) })
    }
}

/// Supplier representing a signed-out shell; every resolution fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedOutSupplier;

impl CredentialSupplier for SignedOutSupplier {
    fn bearer_token(&self, _audience: &str) -> BoxFuture<'_, Result<String, CredentialError>> {
        Box::pin(async { Err(CredentialError::new("no active identity")) })
    }
}
