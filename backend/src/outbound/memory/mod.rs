//! In-process adapters for the document store and event ledger.
//!
//! They back local runs and integration tests; a managed store adapter would
//! implement the same ports.

mod document_store;
mod event_ledger;

pub use document_store::InMemoryDocumentStore;
pub use event_ledger::InMemoryEventLedger;
