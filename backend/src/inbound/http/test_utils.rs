//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;

use crate::domain::DeliveryPolicy;
use crate::domain::ports::{
    DocumentStore, FixtureDocumentStore, FixtureEventLedger, FixtureHealthScoreSource,
    FixtureIdentityProvider, IdentityProvider, NoOpDocumentMirror,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Instant every test clock reports.
pub fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
        .single()
        .expect("valid fixed instant")
}

fn fixed_clock() -> MockClock {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(fixed_instant());
    clock
}

/// Ports backed by fixtures, a fixed clock and the lowest health score.
pub fn fixture_ports() -> HttpStatePorts {
    HttpStatePorts {
        store: Arc::new(FixtureDocumentStore),
        mirror: Arc::new(NoOpDocumentMirror),
        ledger: Arc::new(FixtureEventLedger),
        identity: Arc::new(FixtureIdentityProvider),
        health_scores: Arc::new(FixtureHealthScoreSource::default()),
        clock: Arc::new(fixed_clock()),
    }
}

/// Fixture state with a custom identity provider.
pub fn state_with_identity(identity: impl IdentityProvider + 'static) -> HttpState {
    HttpState::new(
        HttpStatePorts {
            identity: Arc::new(identity),
            ..fixture_ports()
        },
        DeliveryPolicy::Acknowledge,
    )
}

/// Fixture state with a custom document store and delivery policy.
pub fn state_with_store(store: impl DocumentStore + 'static, policy: DeliveryPolicy) -> HttpState {
    HttpState::new(
        HttpStatePorts {
            store: Arc::new(store),
            ..fixture_ports()
        },
        policy,
    )
}
