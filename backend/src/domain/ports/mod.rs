//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Every external collaborator (document store and mirror, identity provider,
//! event ledger, score source) is reached through one of these traits. The process
//! entry point constructs concrete adapters and injects them; handlers never
//! touch ambient global clients.

mod macros;
pub(crate) use macros::define_port_error;

mod document_store;
mod event_ledger;
mod health_score_source;
mod identity_provider;

#[cfg(test)]
pub use document_store::{MockDocumentMirror, MockDocumentStore};
pub use document_store::{
    DocumentMirror, DocumentStore, DocumentStoreError, FixtureDocumentStore, NoOpDocumentMirror,
};
#[cfg(test)]
pub use event_ledger::MockEventLedger;
pub use event_ledger::{EventLedger, EventLedgerError, FixtureEventLedger};
#[cfg(test)]
pub use health_score_source::MockHealthScoreSource;
pub use health_score_source::{FixtureHealthScoreSource, HealthScoreSource};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityProvider, IdentityProviderError};
