//! Port for resolving bearer tokens into caller identities.

use async_trait::async_trait;

use crate::domain::CallerIdentity;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider could not be reached.
        Connection { message: String } => "identity provider connection failed: {message}",
    }
}

/// Driven port for token verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve `token` to the identity it was issued for.
    ///
    /// Returns `Ok(None)` when the token is unknown, expired or malformed.
    async fn verify(&self, token: &str) -> Result<Option<CallerIdentity>, IdentityProviderError>;
}

/// Fixture provider that recognises no token.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn verify(&self, _token: &str) -> Result<Option<CallerIdentity>, IdentityProviderError> {
        Ok(None)
    }
}
