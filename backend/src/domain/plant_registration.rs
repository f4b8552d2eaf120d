//! Reaction to a newly created plant document.
//!
//! The owner's `plantsAdded` counter only ever moves through an atomic
//! increment, so concurrent plant creations for one owner cannot lose updates.
//! Missing `createdAt`/`status` fields are backfilled behind a presence check.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::domain::ports::{DocumentStore, EventLedger};
use crate::domain::reaction::StepRunner;
use crate::domain::{
    is_present, DocumentFields, DocumentId, DocumentPath, EventId, FieldWrites, ReactionReport,
    ReactorStep,
};

/// Name logged for a plant without one.
pub const UNKNOWN_PLANT_NAME: &str = "Unknown";

/// Owner reference carried by a plant snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlantOwner {
    /// No owner, or a falsy `userId`.
    Absent,
    /// A well-formed user id.
    User(DocumentId),
    /// A `userId` that cannot address a user document.
    Invalid(String),
}

impl PlantOwner {
    fn from_value(value: Option<&Value>) -> Self {
        if !is_present(value) {
            return Self::Absent;
        }
        match value {
            Some(Value::String(raw)) => DocumentId::new(raw.as_str())
                .map_or_else(|_| Self::Invalid(raw.clone()), Self::User),
            Some(other) => Self::Invalid(other.to_string()),
            None => Self::Absent,
        }
    }
}

/// Typed view of the created plant document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlantSnapshot {
    plant_id: DocumentId,
    name: Option<String>,
    owner: PlantOwner,
    has_created_at: bool,
}

impl NewPlantSnapshot {
    /// Extract the fields the reactor reads from a raw snapshot.
    #[must_use]
    pub fn from_fields(plant_id: DocumentId, fields: &DocumentFields) -> Self {
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
        Self {
            plant_id,
            name,
            owner: PlantOwner::from_value(fields.get("userId")),
            has_created_at: is_present(fields.get("createdAt")),
        }
    }

    /// Id of the created plant.
    #[must_use]
    pub const fn plant_id(&self) -> &DocumentId {
        &self.plant_id
    }

    /// Plant name, or [`UNKNOWN_PLANT_NAME`].
    #[must_use]
    pub fn name_or_placeholder(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_PLANT_NAME)
    }

    /// Owner reference.
    #[must_use]
    pub const fn owner(&self) -> &PlantOwner {
        &self.owner
    }

    /// Whether the snapshot already carries a creation timestamp.
    #[must_use]
    pub const fn has_created_at(&self) -> bool {
        self.has_created_at
    }
}

/// Counter bump applied to the owner.
#[must_use]
pub fn owner_increment_writes() -> FieldWrites {
    FieldWrites::new()
        .increment("plantsAdded", 1)
        .server_timestamp("lastPlantAddedAt")
}

/// Defaults written onto a plant missing `createdAt`.
#[must_use]
pub fn plant_backfill_writes() -> FieldWrites {
    FieldWrites::new()
        .server_timestamp("createdAt")
        .set("status", "active")
}

/// Reactor for `plants/{id}` creation events.
#[derive(Clone)]
pub struct PlantRegistrationReactor {
    store: Arc<dyn DocumentStore>,
    ledger: Arc<dyn EventLedger>,
}

impl PlantRegistrationReactor {
    /// Create the reactor over its store and ledger.
    pub fn new(store: Arc<dyn DocumentStore>, ledger: Arc<dyn EventLedger>) -> Self {
        Self { store, ledger }
    }

    /// Handle one delivery of a plant creation event.
    pub async fn react(&self, event_id: EventId, snapshot: &NewPlantSnapshot) -> ReactionReport {
        let plant_path = DocumentPath::plant(snapshot.plant_id().clone());
        info!(
            event_id = %event_id,
            plant_id = %snapshot.plant_id(),
            plant_name = snapshot.name_or_placeholder(),
            "new plant added"
        );
        let mut runner = StepRunner::new(self.ledger.as_ref(), event_id, plant_path.to_string());

        match snapshot.owner() {
            PlantOwner::Absent => runner.skip(ReactorStep::IncrementOwnerPlantCount),
            PlantOwner::User(user_id) => {
                let owner_path = DocumentPath::user(user_id.clone());
                runner
                    .run(ReactorStep::IncrementOwnerPlantCount, || async {
                        self.store
                            .update(&owner_path, owner_increment_writes())
                            .await
                            .map(|()| info!(user_id = %user_id, "owner plant count incremented"))
                    })
                    .await;
            }
            PlantOwner::Invalid(raw) => runner.reject(
                ReactorStep::IncrementOwnerPlantCount,
                format!("invalid owner reference '{raw}'"),
            ),
        }

        if snapshot.has_created_at() {
            runner.skip(ReactorStep::BackfillPlantMetadata);
        } else {
            runner
                .run(ReactorStep::BackfillPlantMetadata, || {
                    self.store.update(&plant_path, plant_backfill_writes())
                })
                .await;
        }
        runner.finish()
    }
}
