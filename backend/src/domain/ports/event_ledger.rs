//! Port for claiming reactor steps per event.
//!
//! The dispatcher redelivers events it believes failed, and a timed-out
//! delivery may still be running when its redelivery arrives. Reactors claim
//! each write step before running it; only the first claim for an
//! `(event, step)` pair wins, so overlapping deliveries never repeat
//! non-idempotent writes such as counter increments. A claim whose write
//! fails is released so a later redelivery can retry it.

use async_trait::async_trait;

use crate::domain::{EventId, ReactorStep};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event ledger adapters.
    pub enum EventLedgerError {
        /// The ledger could not be reached.
        Connection { message: String } => "event ledger connection failed: {message}",
        /// The claim or release failed during execution.
        Query { message: String } => "event ledger query failed: {message}",
    }
}

/// Port for per-event step claims.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventLedger: Send + Sync {
    /// Atomically claim `step` for `event_id`.
    ///
    /// Returns `false` when the step is already claimed, whether its write
    /// finished or is still in flight.
    async fn try_claim(&self, event_id: &EventId, step: ReactorStep)
    -> Result<bool, EventLedgerError>;

    /// Drop a claim whose write failed. Releasing an unclaimed step is a no-op.
    async fn release(&self, event_id: &EventId, step: ReactorStep) -> Result<(), EventLedgerError>;
}

/// Fixture ledger that grants every claim.
///
/// Every delivery runs every step, which reproduces plain at-least-once
/// behaviour without an idempotency guard.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEventLedger;

#[async_trait]
impl EventLedger for FixtureEventLedger {
    async fn try_claim(
        &self,
        _event_id: &EventId,
        _step: ReactorStep,
    ) -> Result<bool, EventLedgerError> {
        Ok(true)
    }

    async fn release(&self, _event_id: &EventId, _step: ReactorStep) -> Result<(), EventLedgerError> {
        Ok(())
    }
}
