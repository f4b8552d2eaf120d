//! Reaction to a newly created user document.
//!
//! Two independent steps run for every delivery: the user document is
//! overwritten with default profile fields, and a `user_created` analytics
//! record is appended. Neither step is rolled back when the other fails.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain::ports::{DocumentStore, EventLedger};
use crate::domain::reaction::StepRunner;
use crate::domain::{
    Collection, DocumentFields, DocumentId, DocumentPath, EventId, FieldWrites, ReactionReport,
    ReactorStep,
};

/// Placeholder recorded when the new user has no email.
pub const MISSING_EMAIL: &str = "N/A";
/// `eventType` of the analytics record.
pub const USER_CREATED_EVENT: &str = "user_created";

/// Typed view of the created user document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserSnapshot {
    user_id: DocumentId,
    email: Option<String>,
}

impl NewUserSnapshot {
    /// Extract the fields the reactor reads from a raw snapshot.
    ///
    /// An empty or non-string `email` is treated as absent.
    #[must_use]
    pub fn from_fields(user_id: DocumentId, fields: &DocumentFields) -> Self {
        let email = fields
            .get("email")
            .and_then(Value::as_str)
            .filter(|email| !email.is_empty())
            .map(str::to_owned);
        Self { user_id, email }
    }

    /// Id of the created user.
    #[must_use]
    pub const fn user_id(&self) -> &DocumentId {
        &self.user_id
    }

    /// Email, or [`MISSING_EMAIL`].
    #[must_use]
    pub fn email_or_placeholder(&self) -> &str {
        self.email.as_deref().unwrap_or(MISSING_EMAIL)
    }
}

/// Default profile fields written onto every new user.
///
/// `plantsAdded` is reset to zero on every application.
#[must_use]
pub fn enrichment_writes() -> FieldWrites {
    FieldWrites::new()
        .server_timestamp("createdAt")
        .set("accountStatus", "active")
        .set("membershipLevel", "basic")
        .set("plantsAdded", 0)
        .set("notificationsEnabled", true)
        .set("profileComplete", false)
}

/// Analytics record appended for `snapshot`.
#[must_use]
pub fn signup_analytics_writes(snapshot: &NewUserSnapshot) -> FieldWrites {
    FieldWrites::new()
        .set("eventType", USER_CREATED_EVENT)
        .set("userId", snapshot.user_id().as_ref())
        .server_timestamp("timestamp")
        .set("userEmail", snapshot.email_or_placeholder())
}

/// Reactor for `users/{id}` creation events.
#[derive(Clone)]
pub struct UserEnrichmentReactor {
    store: Arc<dyn DocumentStore>,
    ledger: Arc<dyn EventLedger>,
}

impl UserEnrichmentReactor {
    /// Create the reactor over its store and ledger.
    pub fn new(store: Arc<dyn DocumentStore>, ledger: Arc<dyn EventLedger>) -> Self {
        Self { store, ledger }
    }

    /// Handle one delivery of a user creation event.
    pub async fn react(&self, event_id: EventId, snapshot: &NewUserSnapshot) -> ReactionReport {
        let path = DocumentPath::user(snapshot.user_id().clone());
        info!(
            event_id = %event_id,
            user_id = %snapshot.user_id(),
            email = snapshot.email_or_placeholder(),
            "new user created"
        );
        let mut runner = StepRunner::new(self.ledger.as_ref(), event_id, path.to_string());
        runner
            .run(ReactorStep::EnrichUser, || {
                self.store.update(&path, enrichment_writes())
            })
            .await;
        runner
            .run(ReactorStep::RecordSignupAnalytics, || async {
                self.store
                    .append(Collection::Analytics, signup_analytics_writes(snapshot))
                    .await
                    .map(|id| info!(analytics_id = %id, "signup analytics recorded"))
            })
            .await;
        let report = runner.finish();
        if !report.has_failures() {
            info!(user_id = %snapshot.user_id(), "user profile enriched");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        DocumentStoreError, FixtureEventLedger, MockDocumentStore, MockEventLedger,
    };
    use crate::domain::{FieldWrite, StepOutcome};
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn snapshot() -> NewUserSnapshot {
        let fields = json!({"email": "fern@example.com"});
        NewUserSnapshot::from_fields(
            DocumentId::new("u1").expect("valid id"),
            fields.as_object().expect("object"),
        )
    }

    fn event() -> EventId {
        EventId::new("evt-user-1").expect("valid id")
    }

    #[rstest]
    #[case(json!({}), "N/A")]
    #[case(json!({"email": ""}), "N/A")]
    #[case(json!({"email": 42}), "N/A")]
    #[case(json!({"email": "a@b.c"}), "a@b.c")]
    fn email_falls_back_to_placeholder(#[case] fields: Value, #[case] expected: &str) {
        let snapshot = NewUserSnapshot::from_fields(
            DocumentId::new("u1").expect("valid id"),
            fields.as_object().expect("object"),
        );
        assert_eq!(snapshot.email_or_placeholder(), expected);
    }

    #[rstest]
    fn enrichment_resets_the_plant_counter() {
        let writes = enrichment_writes();
        assert_eq!(writes.get("plantsAdded"), Some(&FieldWrite::Set(json!(0))));
        assert_eq!(writes.get("createdAt"), Some(&FieldWrite::ServerTimestamp));
        assert_eq!(writes.len(), 6);
    }

    #[rstest]
    #[tokio::test]
    async fn applies_both_steps(snapshot: NewUserSnapshot) {
        let mut store = MockDocumentStore::new();
        store
            .expect_update()
            .withf(|path, writes| path.to_string() == "users/u1" && writes == &enrichment_writes())
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_append()
            .withf(|collection, writes| {
                *collection == Collection::Analytics
                    && writes.get("userEmail") == Some(&FieldWrite::Set(json!("fern@example.com")))
                    && writes.get("eventType") == Some(&FieldWrite::Set(json!("user_created")))
            })
            .times(1)
            .returning(|_, _| Ok(DocumentId::new("a1").expect("valid id")));
        let reactor = UserEnrichmentReactor::new(Arc::new(store), Arc::new(FixtureEventLedger));

        let report = reactor.react(event(), &snapshot).await;

        assert_eq!(report.document, "users/u1");
        assert_eq!(report.outcome_of(ReactorStep::EnrichUser), Some(&StepOutcome::Applied));
        assert_eq!(
            report.outcome_of(ReactorStep::RecordSignupAnalytics),
            Some(&StepOutcome::Applied)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn analytics_still_runs_when_enrichment_fails(snapshot: NewUserSnapshot) {
        let mut store = MockDocumentStore::new();
        store
            .expect_update()
            .returning(|_, _| Err(DocumentStoreError::connection("store offline")));
        store
            .expect_append()
            .times(1)
            .returning(|_, _| Ok(DocumentId::random()));
        let reactor = UserEnrichmentReactor::new(Arc::new(store), Arc::new(FixtureEventLedger));

        let report = reactor.react(event(), &snapshot).await;

        assert!(matches!(
            report.outcome_of(ReactorStep::EnrichUser),
            Some(StepOutcome::Failed { .. })
        ));
        assert_eq!(
            report.outcome_of(ReactorStep::RecordSignupAnalytics),
            Some(&StepOutcome::Applied)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn redelivery_skips_claimed_steps(snapshot: NewUserSnapshot) {
        let mut store = MockDocumentStore::new();
        store.expect_update().never();
        store
            .expect_append()
            .times(1)
            .returning(|_, _| Ok(DocumentId::random()));
        let mut ledger = MockEventLedger::new();
        ledger
            .expect_try_claim()
            .returning(|_, step| Ok(step != ReactorStep::EnrichUser));
        ledger.expect_release().never();
        let reactor = UserEnrichmentReactor::new(Arc::new(store), Arc::new(ledger));

        let report = reactor.react(event(), &snapshot).await;

        assert_eq!(
            report.outcome_of(ReactorStep::EnrichUser),
            Some(&StepOutcome::SkippedAlreadyApplied)
        );
        assert!(!report.has_failures());
    }
}
