//! Document event endpoints called by the dispatcher.
//!
//! ```text
//! POST /triggers/users/created    {"eventId":"e1","documentId":"u1","value":{...}}
//! POST /triggers/plants/created   {"eventId":"e2","documentId":"p1","value":{...}}
//! POST /triggers/messages/updated {"eventId":"e3","documentId":"m1","before":{...},"after":{...}}
//! ```
//!
//! Creation snapshots are mirrored into the store first, so stores that do
//! not already hold the document (the in-memory emulator) see it. Each
//! endpoint answers with the reaction report. Under the `retry` delivery
//! policy a report with transiently failed steps becomes a 503 so the
//! dispatcher redelivers the event; rejected steps are always acknowledged.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::{
    DeliveryPolicy, DocumentFields, DocumentId, DocumentPath, EventId, LikesChange,
    NewPlantSnapshot, NewUserSnapshot, ReactionReport,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;

/// Delivery of a document creation.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCreated {
    /// Dispatcher event id, stable across redeliveries.
    pub event_id: EventId,
    /// Id of the created document.
    #[schema(value_type = String, example = "u1")]
    pub document_id: DocumentId,
    /// Snapshot of the created document.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: DocumentFields,
}

/// Delivery of a document update.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdated {
    /// Dispatcher event id, stable across redeliveries.
    pub event_id: EventId,
    /// Id of the updated document.
    #[schema(value_type = String, example = "m1")]
    pub document_id: DocumentId,
    /// Snapshot before the update.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub before: DocumentFields,
    /// Snapshot after the update.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub after: DocumentFields,
}

/// Make the delivered snapshot visible to the store before reacting.
///
/// A mirror failure is logged and the reactor still runs; its writes then
/// report the store error themselves.
async fn mirror_created(state: &HttpState, path: &DocumentPath, value: &DocumentFields) {
    if let Err(err) = state.mirror.mirror_created(path, value).await {
        warn!(document = %path, error = %err, "created document could not be mirrored");
    }
}

fn settle(policy: DeliveryPolicy, report: ReactionReport) -> ApiResult<web::Json<ReactionReport>> {
    if report.has_rejections() {
        let rejected: Vec<&str> = report.rejected_steps().map(|step| step.step.as_str()).collect();
        warn!(
            event_id = %report.event_id,
            document = %report.document,
            rejected_steps = ?rejected,
            "acknowledging delivery with permanently rejected steps"
        );
    }
    if report.has_failures() && policy == DeliveryPolicy::Acknowledge {
        let failed: Vec<&str> = report.failed_steps().map(|step| step.step.as_str()).collect();
        warn!(
            event_id = %report.event_id,
            document = %report.document,
            failed_steps = ?failed,
            "acknowledging delivery with failed steps"
        );
    }
    policy.settle(report).map(web::Json)
}

/// Enrich a newly created user and record signup analytics.
#[utoipa::path(
    post,
    path = "/triggers/users/created",
    request_body = DocumentCreated,
    responses(
        (status = 200, description = "Reaction report", body = ReactionReport),
        (status = 400, description = "Malformed delivery", body = ErrorEnvelope),
        (status = 503, description = "Failed steps under the retry policy", body = ErrorEnvelope)
    ),
    tags = ["triggers"],
    operation_id = "newUserCreated",
    security([])
)]
#[post("/triggers/users/created")]
pub async fn user_created(
    state: web::Data<HttpState>,
    payload: web::Json<DocumentCreated>,
) -> ApiResult<web::Json<ReactionReport>> {
    let DocumentCreated {
        event_id,
        document_id,
        value,
    } = payload.into_inner();
    mirror_created(&state, &DocumentPath::user(document_id.clone()), &value).await;
    let snapshot = NewUserSnapshot::from_fields(document_id, &value);
    let report = state.user_reactor.react(event_id, &snapshot).await;
    settle(state.delivery_policy, report)
}

/// Count a new plant against its owner and backfill its metadata.
#[utoipa::path(
    post,
    path = "/triggers/plants/created",
    request_body = DocumentCreated,
    responses(
        (status = 200, description = "Reaction report", body = ReactionReport),
        (status = 400, description = "Malformed delivery", body = ErrorEnvelope),
        (status = 503, description = "Failed steps under the retry policy", body = ErrorEnvelope)
    ),
    tags = ["triggers"],
    operation_id = "plantAdded",
    security([])
)]
#[post("/triggers/plants/created")]
pub async fn plant_created(
    state: web::Data<HttpState>,
    payload: web::Json<DocumentCreated>,
) -> ApiResult<web::Json<ReactionReport>> {
    let DocumentCreated {
        event_id,
        document_id,
        value,
    } = payload.into_inner();
    mirror_created(&state, &DocumentPath::plant(document_id.clone()), &value).await;
    let snapshot = NewPlantSnapshot::from_fields(document_id, &value);
    let report = state.plant_reactor.react(event_id, &snapshot).await;
    settle(state.delivery_policy, report)
}

/// Observe like count changes on a message.
#[utoipa::path(
    post,
    path = "/triggers/messages/updated",
    request_body = DocumentUpdated,
    responses(
        (status = 200, description = "Reaction report", body = ReactionReport),
        (status = 400, description = "Malformed delivery", body = ErrorEnvelope)
    ),
    tags = ["triggers"],
    operation_id = "messageUpdated",
    security([])
)]
#[post("/triggers/messages/updated")]
pub async fn message_updated(
    state: web::Data<HttpState>,
    payload: web::Json<DocumentUpdated>,
) -> ApiResult<web::Json<ReactionReport>> {
    let DocumentUpdated {
        event_id,
        document_id,
        before,
        after,
    } = payload.into_inner();
    let change = LikesChange::from_snapshots(&before, &after);
    let report = state.message_reactor.react(event_id, &document_id, change);
    settle(state.delivery_policy, report)
}
