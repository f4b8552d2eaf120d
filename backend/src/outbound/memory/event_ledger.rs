//! In-process event ledger.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{EventLedger, EventLedgerError};
use crate::domain::{EventId, ReactorStep};

/// Ledger holding step claims for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryEventLedger {
    claimed: Mutex<HashSet<(EventId, ReactorStep)>>,
}

impl InMemoryEventLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashSet<(EventId, ReactorStep)>>, EventLedgerError> {
        self.claimed
            .lock()
            .map_err(|_| EventLedgerError::query("event ledger lock poisoned"))
    }
}

#[async_trait]
impl EventLedger for InMemoryEventLedger {
    async fn try_claim(&self, event_id: &EventId, step: ReactorStep) -> Result<bool, EventLedgerError> {
        Ok(self.lock()?.insert((event_id.clone(), step)))
    }

    async fn release(&self, event_id: &EventId, step: ReactorStep) -> Result<(), EventLedgerError> {
        self.lock()?.remove(&(event_id.clone(), step));
        Ok(())
    }
}
