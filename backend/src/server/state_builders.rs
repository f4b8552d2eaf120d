//! Builders wiring adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use leafline::inbound::http::state::{HttpState, HttpStatePorts};
use leafline::outbound::memory::{InMemoryDocumentStore, InMemoryEventLedger};

use super::ServerConfig;

/// Build the shared HTTP state from `config`.
///
/// The document store and event ledger live in process memory and share the
/// system clock with the services. Nothing else writes to that store, so it
/// also mirrors the created documents the triggers deliver.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store = Arc::new(InMemoryDocumentStore::new(clock.clone()));
    let ports = HttpStatePorts {
        store: store.clone(),
        mirror: store,
        ledger: Arc::new(InMemoryEventLedger::new()),
        identity: config.identity.clone(),
        health_scores: config.health_scores.clone(),
        clock,
    };
    web::Data::new(HttpState::new(ports, config.delivery_policy))
}
