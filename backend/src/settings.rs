//! Process settings loaded via OrthoConfig from CLI arguments and
//! `LEAFLINE_*` environment variables.

use std::fmt;
use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{DeliveryPolicy, DeliveryPolicyParseError};

/// Address bound when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        /// Rejected value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },
    /// `delivery_policy` is not a known policy.
    #[error(transparent)]
    DeliveryPolicy(#[from] DeliveryPolicyParseError),
}

/// Settings for the LeafLine backend.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LEAFLINE")]
pub struct LeaflineSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// `acknowledge` (default) or `retry`.
    pub delivery_policy: Option<String>,
    /// Comma-separated `token:uid` pairs accepted as bearer tokens.
    pub identity_tokens: Option<String>,
    /// Seed for the health score generator; entropy when absent.
    pub health_score_seed: Option<u64>,
}

impl fmt::Debug for LeaflineSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaflineSettings")
            .field("bind_addr", &self.bind_addr)
            .field("delivery_policy", &self.delivery_policy)
            .field(
                "identity_tokens",
                &self.identity_tokens.as_ref().map(|_| "<redacted>"),
            )
            .field("health_score_seed", &self.health_score_seed)
            .finish()
    }
}

impl LeaflineSettings {
    /// Configured bind address, falling back to [`DEFAULT_BIND_ADDR`].
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured delivery policy, defaulting to acknowledge.
    pub fn delivery_policy(&self) -> Result<DeliveryPolicy, SettingsError> {
        match self.delivery_policy.as_deref() {
            None => Ok(DeliveryPolicy::default()),
            Some(raw) => Ok(raw.parse()?),
        }
    }

    /// Move the raw token table out of the settings.
    pub fn take_identity_tokens(&mut self) -> String {
        self.identity_tokens.take().unwrap_or_default()
    }
}
