//! Identity provider backed by a static token table.
//!
//! Tokens come from configuration as comma-separated `token:uid` pairs. The
//! raw configuration string is zeroised once parsed and the table is
//! zeroised on drop.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use zeroize::Zeroize;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::CallerIdentity;

/// Errors raised while parsing the token table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityTokensParseError {
    /// An entry was not of the form `token:uid`.
    #[error("identity token entry {index} must look like 'token:uid'")]
    MalformedEntry {
        /// Zero-based entry position; the entry itself is not echoed.
        index: usize,
    },
}

/// Provider accepting a fixed set of bearer tokens.
#[derive(Default)]
pub struct StaticTokenIdentityProvider {
    tokens: HashMap<String, CallerIdentity>,
}

impl StaticTokenIdentityProvider {
    /// Parse `raw` and zeroise it, whether or not parsing succeeds.
    ///
    /// # Examples
    /// ```
    /// use leafline::outbound::identity::StaticTokenIdentityProvider;
    ///
    /// let mut raw = String::from("tok-1:gardener-1, tok-2:gardener-2");
    /// let provider = StaticTokenIdentityProvider::parse(&mut raw).expect("valid table");
    /// assert_eq!(provider.len(), 2);
    /// assert!(raw.is_empty());
    /// ```
    pub fn parse(raw: &mut String) -> Result<Self, IdentityTokensParseError> {
        let parsed = Self::parse_entries(raw);
        raw.zeroize();
        parsed
    }

    fn parse_entries(raw: &str) -> Result<Self, IdentityTokensParseError> {
        let mut tokens = HashMap::new();
        let entries = raw.split(',').map(str::trim).filter(|entry| !entry.is_empty());
        for (index, entry) in entries.enumerate() {
            let (token, uid) = entry
                .split_once(':')
                .map(|(token, uid)| (token.trim(), uid.trim()))
                .filter(|(token, _)| !token.is_empty())
                .ok_or(IdentityTokensParseError::MalformedEntry { index })?;
            let identity = CallerIdentity::new(uid)
                .map_err(|_| IdentityTokensParseError::MalformedEntry { index })?;
            tokens.insert(token.to_owned(), identity);
        }
        Ok(Self { tokens })
    }

    /// Number of accepted tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Drop for StaticTokenIdentityProvider {
    fn drop(&mut self) {
        for (mut token, _) in self.tokens.drain() {
            token.zeroize();
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Option<CallerIdentity>, IdentityProviderError> {
        Ok(self.tokens.get(token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn resolves_known_tokens_only() {
        let mut raw = String::from("tok-1:gardener-1");
        let provider = StaticTokenIdentityProvider::parse(&mut raw).expect("valid table");

        let known = provider.verify("tok-1").await.expect("lookup succeeds");
        assert_eq!(known.as_ref().map(CallerIdentity::uid), Some("gardener-1"));
        assert!(provider.verify("tok-2").await.expect("lookup succeeds").is_none());
    }

    #[rstest]
    #[case("tok-1", 0)]
    #[case("tok-1:u1,:u2", 1)]
    #[case("tok-1:u1,tok-2: ", 1)]
    fn rejects_malformed_entries(#[case] table: &str, #[case] index: usize) {
        let mut raw = table.to_owned();
        let err = StaticTokenIdentityProvider::parse(&mut raw)
            .err()
            .expect("malformed table");
        assert_eq!(err, IdentityTokensParseError::MalformedEntry { index });
        assert!(raw.is_empty(), "raw table is scrubbed even on failure");
    }

    #[rstest]
    fn empty_tables_accept_nothing() {
        let mut raw = String::new();
        let provider = StaticTokenIdentityProvider::parse(&mut raw).expect("empty table");
        assert!(provider.is_empty());
    }
}
