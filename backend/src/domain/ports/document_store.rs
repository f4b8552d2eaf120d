//! Port abstraction for the managed document store.
//!
//! Only the operations the handlers need are modelled: a partial update of a
//! single existing document and an append with a store-assigned id. Server
//! timestamps and atomic increments travel as [`FieldWrite`] sentinels and are
//! resolved by the adapter when the write commits.
//!
//! [`FieldWrite`]: crate::domain::FieldWrite

use async_trait::async_trait;

use crate::domain::{Collection, DocumentFields, DocumentId, DocumentPath, FieldWrites};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } => "document store connection failed: {message}",
        /// An update targeted a document that does not exist.
        NotFound { path: String } => "document not found: {path}",
        /// The store refused the write (type mismatch, permissions, limits).
        Rejected { message: String } => "document store rejected write: {message}",
    }
}

impl DocumentStoreError {
    /// Whether retrying the same write later may succeed.
    ///
    /// Only connection failures are transient; a missing document or a
    /// refused write fails the same way on every attempt.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Port for single-document writes.
///
/// Each call is atomic for the one document it touches. No call spans more
/// than one document, and no ordering is guaranteed between calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Apply `writes` to the existing document at `path`.
    ///
    /// Fields not mentioned are left untouched. Fails with
    /// [`DocumentStoreError::NotFound`] when the document does not exist.
    async fn update(&self, path: &DocumentPath, writes: FieldWrites)
    -> Result<(), DocumentStoreError>;

    /// Create a new document in `collection` and return its assigned id.
    async fn append(
        &self,
        collection: Collection,
        writes: FieldWrites,
    ) -> Result<DocumentId, DocumentStoreError>;
}

/// Fixture implementation that accepts and discards every write.
///
/// Use it where store behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDocumentStore;

#[async_trait]
impl DocumentStore for FixtureDocumentStore {
    async fn update(
        &self,
        _path: &DocumentPath,
        _writes: FieldWrites,
    ) -> Result<(), DocumentStoreError> {
        Ok(())
    }

    async fn append(
        &self,
        _collection: Collection,
        _writes: FieldWrites,
    ) -> Result<DocumentId, DocumentStoreError> {
        Ok(DocumentId::random())
    }
}

/// Port that makes a delivered creation snapshot visible to the store.
///
/// A managed store already holds the document that triggered the event, so
/// it pairs with [`NoOpDocumentMirror`]. The in-memory store is fed by no
/// client; it mirrors each created document before a reactor writes to it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentMirror: Send + Sync {
    /// Create the document at `path` from `fields` unless it already exists.
    ///
    /// An existing document is left untouched, so a redelivered snapshot
    /// never rolls back writes made since.
    async fn mirror_created(
        &self,
        path: &DocumentPath,
        fields: &DocumentFields,
    ) -> Result<(), DocumentStoreError>;
}

/// Mirror for stores that already hold every delivered document.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpDocumentMirror;

#[async_trait]
impl DocumentMirror for NoOpDocumentMirror {
    async fn mirror_created(
        &self,
        _path: &DocumentPath,
        _fields: &DocumentFields,
    ) -> Result<(), DocumentStoreError> {
        Ok(())
    }
}
