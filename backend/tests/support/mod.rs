//! Shared harness for HTTP integration tests.
//!
//! Builds the full application over the in-memory adapters, a fixed clock and
//! a seeded health score source, and offers JSON request helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use leafline::Trace;
use leafline::domain::ports::{DocumentStore, DocumentStoreError, EventLedger};
use leafline::domain::{
    Collection, DeliveryPolicy, DocumentFields, DocumentId, DocumentPath, FieldWrites,
};
use leafline::inbound::http::configure_routes;
use leafline::inbound::http::state::{HttpState, HttpStatePorts};
use leafline::outbound::health_score::RandomHealthScoreSource;
use leafline::outbound::identity::StaticTokenIdentityProvider;
use leafline::outbound::memory::{InMemoryDocumentStore, InMemoryEventLedger};
use mockable::MockClock;
use serde_json::Value;

/// Bearer token accepted for [`GARDENER_UID`].
pub const GARDENER_TOKEN: &str = "tok-gardener";
/// Uid bound to [`GARDENER_TOKEN`].
pub const GARDENER_UID: &str = "gardener-1";
/// Timestamp every server-side write resolves to.
pub const FIXED_TIMESTAMP: &str = "2024-05-01T09:30:00.000Z";

/// Instant reported by the harness clock.
pub fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
        .single()
        .expect("valid fixed instant")
}

/// Clock pinned to [`fixed_instant`].
pub fn fixed_clock() -> Arc<MockClock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(fixed_instant());
    Arc::new(clock)
}

/// Adapters behind one application instance.
pub struct Harness {
    pub store: Arc<InMemoryDocumentStore>,
    pub ledger: Arc<InMemoryEventLedger>,
    appended: Arc<Mutex<Vec<DocumentPath>>>,
}

impl Harness {
    /// Empty store and ledger.
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryDocumentStore::new(fixed_clock())),
            ledger: Arc::new(InMemoryEventLedger::new()),
            appended: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Seed `path` with the JSON object `fields`.
    pub fn seed(&self, path: DocumentPath, fields: Value) {
        let Value::Object(fields) = fields else {
            panic!("seed fields must be a JSON object");
        };
        let created = self.store.create_if_absent(path, fields).expect("seed document");
        assert!(created, "seeded documents must be new");
    }

    /// Current fields of `users/{id}`.
    pub fn user(&self, id: &str) -> DocumentFields {
        self.document(DocumentPath::user(document_id(id)))
    }

    /// Current fields of `plants/{id}`.
    pub fn plant(&self, id: &str) -> DocumentFields {
        self.document(DocumentPath::plant(document_id(id)))
    }

    /// Documents appended to `collection` through the application, oldest first.
    pub fn appended(&self, collection: Collection) -> Vec<DocumentFields> {
        let paths = self.appended.lock().expect("append log lock").clone();
        paths
            .into_iter()
            .filter(|path| path.collection == collection)
            .map(|path| self.document(path))
            .collect()
    }

    fn document(&self, path: DocumentPath) -> DocumentFields {
        self.store
            .get(&path)
            .expect("store readable")
            .unwrap_or_else(|| panic!("{path} should exist"))
    }

    /// State over the harness adapters.
    pub fn state(&self, policy: DeliveryPolicy) -> HttpState {
        self.state_with_store(self.store.clone(), policy)
    }

    /// State whose document writes go through `store` instead.
    ///
    /// Delivered creation snapshots are still mirrored into the harness
    /// store, and appends that succeed are logged for [`Harness::appended`].
    pub fn state_with_store(&self, store: Arc<dyn DocumentStore>, policy: DeliveryPolicy) -> HttpState {
        let mut tokens = format!("{GARDENER_TOKEN}:{GARDENER_UID}");
        let identity = StaticTokenIdentityProvider::parse(&mut tokens).expect("valid token table");
        let ledger: Arc<dyn EventLedger> = self.ledger.clone();
        let store = Arc::new(AppendLoggingStore {
            inner: store,
            appended: self.appended.clone(),
        });
        HttpState::new(
            HttpStatePorts {
                store,
                mirror: self.store.clone(),
                ledger,
                identity: Arc::new(identity),
                health_scores: Arc::new(RandomHealthScoreSource::seeded(7)),
                clock: fixed_clock(),
            },
            policy,
        )
    }
}

/// Store decorator noting the path of every successful append.
struct AppendLoggingStore {
    inner: Arc<dyn DocumentStore>,
    appended: Arc<Mutex<Vec<DocumentPath>>>,
}

#[async_trait]
impl DocumentStore for AppendLoggingStore {
    async fn update(&self, path: &DocumentPath, writes: FieldWrites) -> Result<(), DocumentStoreError> {
        self.inner.update(path, writes).await
    }

    async fn append(
        &self,
        collection: Collection,
        writes: FieldWrites,
    ) -> Result<DocumentId, DocumentStoreError> {
        let id = self.inner.append(collection, writes).await?;
        self.appended
            .lock()
            .expect("append log lock")
            .push(DocumentPath::new(collection, id.clone()));
        Ok(id)
    }
}

/// Parse a document id used in a test.
pub fn document_id(id: &str) -> DocumentId {
    DocumentId::new(id).expect("valid document id")
}

/// Initialise the application over `state`.
pub async fn init_app(
    state: HttpState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .wrap(Trace)
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await
}

/// POST `body` to `path`, optionally as the test gardener.
pub async fn post_json<S>(app: &S, path: &str, body: Value, authenticated: bool) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let mut req = test::TestRequest::post().uri(path).set_json(body);
    if authenticated {
        req = req.insert_header((AUTHORIZATION, format!("Bearer {GARDENER_TOKEN}")));
    }
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON response body")
    };
    (status, json)
}
