//! In-process document store.
//!
//! Every call takes the store lock once and applies its writes to a copy of
//! the target document before committing, so each call is atomic for its
//! document and increments never lose updates under concurrency.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Number, Value};
use tracing::debug;

use crate::domain::ports::{DocumentMirror, DocumentStore, DocumentStoreError};
use crate::domain::{
    iso_timestamp, Collection, DocumentFields, DocumentId, DocumentPath, FieldWrite, FieldWrites,
};

/// Document store keeping every document in memory.
pub struct InMemoryDocumentStore {
    documents: Mutex<BTreeMap<DocumentPath, DocumentFields>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryDocumentStore {
    /// Create an empty store resolving server timestamps with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<DocumentPath, DocumentFields>>, DocumentStoreError> {
        self.documents
            .lock()
            .map_err(|_| DocumentStoreError::connection("document store lock poisoned"))
    }

    /// Create the document at `path` from `fields` unless one exists.
    ///
    /// Returns whether the document was created.
    pub fn create_if_absent(
        &self,
        path: DocumentPath,
        fields: DocumentFields,
    ) -> Result<bool, DocumentStoreError> {
        match self.lock()?.entry(path) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(fields);
                Ok(true)
            }
        }
    }

    /// Copy of the document at `path`, if it exists.
    pub fn get(&self, path: &DocumentPath) -> Result<Option<DocumentFields>, DocumentStoreError> {
        Ok(self.lock()?.get(path).cloned())
    }

    fn apply(&self, fields: &mut DocumentFields, writes: FieldWrites) -> Result<(), DocumentStoreError> {
        let now = Value::String(iso_timestamp(self.clock.utc()));
        for (field, write) in writes {
            let value = match write {
                FieldWrite::Set(value) => value,
                FieldWrite::ServerTimestamp => now.clone(),
                FieldWrite::Increment(by) => increment(fields.get(&field), by)
                    .ok_or_else(|| {
                        DocumentStoreError::rejected(format!("increment of '{field}' overflows"))
                    })?,
            };
            fields.insert(field, value);
        }
        Ok(())
    }
}

/// Add `by` to `current`; a missing or non-numeric field counts as zero.
fn increment(current: Option<&Value>, by: i64) -> Option<Value> {
    match current.and_then(Value::as_number) {
        Some(number) if number.is_i64() || number.is_u64() => number
            .as_i64()
            .and_then(|value| value.checked_add(by))
            .map(Value::from),
        Some(number) => number
            .as_f64()
            .and_then(|value| Number::from_f64(value + by as f64))
            .map(Value::Number),
        None => Some(Value::from(by)),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn update(&self, path: &DocumentPath, writes: FieldWrites) -> Result<(), DocumentStoreError> {
        let mut documents = self.lock()?;
        let current = documents
            .get(path)
            .ok_or_else(|| DocumentStoreError::not_found(path.to_string()))?;
        let mut next = current.clone();
        self.apply(&mut next, writes)?;
        documents.insert(path.clone(), next);
        Ok(())
    }

    async fn append(
        &self,
        collection: Collection,
        writes: FieldWrites,
    ) -> Result<DocumentId, DocumentStoreError> {
        let mut fields = DocumentFields::new();
        self.apply(&mut fields, writes)?;
        let id = DocumentId::random();
        self.lock()?.insert(DocumentPath::new(collection, id.clone()), fields);
        Ok(id)
    }
}

#[async_trait]
impl DocumentMirror for InMemoryDocumentStore {
    async fn mirror_created(
        &self,
        path: &DocumentPath,
        fields: &DocumentFields,
    ) -> Result<(), DocumentStoreError> {
        if self.create_if_absent(path.clone(), fields.clone())? {
            debug!(document = %path, "mirrored created document");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockable::MockClock;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn store() -> InMemoryDocumentStore {
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
                .single()
                .expect("valid instant"),
        );
        InMemoryDocumentStore::new(Arc::new(clock))
    }

    fn user(id: &str) -> DocumentPath {
        DocumentPath::user(DocumentId::new(id).expect("valid id"))
    }

    fn fields(value: Value) -> DocumentFields {
        value.as_object().cloned().expect("object")
    }

    #[rstest]
    #[tokio::test]
    async fn updates_merge_and_resolve_sentinels(store: InMemoryDocumentStore) {
        store
            .create_if_absent(user("u1"), fields(json!({"email": "a@b.c", "plantsAdded": 2})))
            .expect("seed");
        store
            .update(
                &user("u1"),
                FieldWrites::new()
                    .increment("plantsAdded", 1)
                    .server_timestamp("lastPlantAddedAt"),
            )
            .await
            .expect("update succeeds");
        let doc = store.get(&user("u1")).expect("read").expect("document exists");
        assert_eq!(
            Value::Object(doc),
            json!({
                "email": "a@b.c",
                "plantsAdded": 3,
                "lastPlantAddedAt": "2024-05-01T09:30:00.000Z"
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn updates_to_missing_documents_fail(store: InMemoryDocumentStore) {
        let err = store
            .update(&user("ghost"), FieldWrites::new().set("a", 1))
            .await
            .expect_err("missing document");
        assert_eq!(err, DocumentStoreError::not_found("users/ghost"));
        assert!(store.get(&user("ghost")).expect("read").is_none());
    }

    #[rstest]
    #[case(None, 1, Some(json!(1)))]
    #[case(Some(json!("text")), 2, Some(json!(2)))]
    #[case(Some(json!(1.5)), 1, Some(json!(2.5)))]
    #[case(Some(json!(i64::MAX)), 1, None)]
    fn increments_follow_store_semantics(
        #[case] current: Option<Value>,
        #[case] by: i64,
        #[case] expected: Option<Value>,
    ) {
        assert_eq!(increment(current.as_ref(), by), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_writes_leave_the_document_untouched(store: InMemoryDocumentStore) {
        store
            .create_if_absent(user("u1"), fields(json!({"plantsAdded": i64::MAX})))
            .expect("seed");
        let result = store
            .update(
                &user("u1"),
                FieldWrites::new().set("status", "x").increment("plantsAdded", 1),
            )
            .await;
        assert!(result.is_err());
        let doc = store.get(&user("u1")).expect("read").expect("exists");
        assert!(doc.get("status").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn appends_assign_ids(store: InMemoryDocumentStore) {
        let id = store
            .append(Collection::Analytics, FieldWrites::new().set("eventType", "user_created"))
            .await
            .expect("append succeeds");
        let record = store
            .get(&DocumentPath::new(Collection::Analytics, id))
            .expect("read")
            .expect("appended document exists");
        assert_eq!(record.get("eventType"), Some(&json!("user_created")));
    }

    #[rstest]
    #[tokio::test]
    async fn mirroring_creates_missing_documents_only(store: InMemoryDocumentStore) {
        store
            .mirror_created(&user("u1"), &fields(json!({"email": "a@b.c"})))
            .await
            .expect("mirror succeeds");
        store
            .update(&user("u1"), FieldWrites::new().set("plantsAdded", 3))
            .await
            .expect("update succeeds");
        store
            .mirror_created(&user("u1"), &fields(json!({"email": "stale@b.c"})))
            .await
            .expect("mirror succeeds");

        let doc = store.get(&user("u1")).expect("read").expect("document exists");
        assert_eq!(Value::Object(doc), json!({"email": "a@b.c", "plantsAdded": 3}));
    }
}
