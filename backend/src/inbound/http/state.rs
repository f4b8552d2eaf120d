//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    DocumentMirror, DocumentStore, EventLedger, HealthScoreSource, IdentityProvider,
};
use crate::domain::{
    DeliveryPolicy, GreetingService, MessageEngagementReactor, PlantCareService,
    PlantRegistrationReactor, UserEnrichmentReactor,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub store: Arc<dyn DocumentStore>,
    pub mirror: Arc<dyn DocumentMirror>,
    pub ledger: Arc<dyn EventLedger>,
    pub identity: Arc<dyn IdentityProvider>,
    pub health_scores: Arc<dyn HealthScoreSource>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityProvider>,
    pub mirror: Arc<dyn DocumentMirror>,
    pub greeting: GreetingService,
    pub plant_care: PlantCareService,
    pub user_reactor: UserEnrichmentReactor,
    pub plant_reactor: PlantRegistrationReactor,
    pub message_reactor: MessageEngagementReactor,
    pub delivery_policy: DeliveryPolicy,
}

impl HttpState {
    /// Wire services and reactors over `ports`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use leafline::domain::DeliveryPolicy;
    /// use leafline::domain::ports::{
    ///     FixtureDocumentStore, FixtureEventLedger, FixtureHealthScoreSource,
    ///     FixtureIdentityProvider, NoOpDocumentMirror,
    /// };
    /// use leafline::inbound::http::state::{HttpState, HttpStatePorts};
    /// use mockable::DefaultClock;
    ///
    /// let ports = HttpStatePorts {
    ///     store: Arc::new(FixtureDocumentStore),
    ///     mirror: Arc::new(NoOpDocumentMirror),
    ///     ledger: Arc::new(FixtureEventLedger),
    ///     identity: Arc::new(FixtureIdentityProvider),
    ///     health_scores: Arc::new(FixtureHealthScoreSource::default()),
    ///     clock: Arc::new(DefaultClock),
    /// };
    /// let state = HttpState::new(ports, DeliveryPolicy::Retry);
    /// assert_eq!(state.delivery_policy, DeliveryPolicy::Retry);
    /// ```
    pub fn new(ports: HttpStatePorts, delivery_policy: DeliveryPolicy) -> Self {
        let HttpStatePorts {
            store,
            mirror,
            ledger,
            identity,
            health_scores,
            clock,
        } = ports;
        Self {
            identity,
            mirror,
            greeting: GreetingService::new(clock.clone()),
            plant_care: PlantCareService::new(health_scores, clock),
            user_reactor: UserEnrichmentReactor::new(store.clone(), ledger.clone()),
            plant_reactor: PlantRegistrationReactor::new(store, ledger),
            message_reactor: MessageEngagementReactor,
            delivery_policy,
        }
    }
}
