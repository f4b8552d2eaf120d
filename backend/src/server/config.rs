//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use leafline::domain::DeliveryPolicy;
use leafline::domain::ports::{HealthScoreSource, IdentityProvider};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) delivery_policy: DeliveryPolicy,
    pub(crate) identity: Arc<dyn IdentityProvider>,
    pub(crate) health_scores: Arc<dyn HealthScoreSource>,
}

impl ServerConfig {
    /// Construct a server configuration with its required collaborators.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        identity: Arc<dyn IdentityProvider>,
        health_scores: Arc<dyn HealthScoreSource>,
    ) -> Self {
        Self {
            bind_addr,
            delivery_policy: DeliveryPolicy::default(),
            identity,
            health_scores,
        }
    }

    /// Choose how reactor step failures reach the dispatcher.
    #[must_use]
    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.delivery_policy = policy;
        self
    }
}
