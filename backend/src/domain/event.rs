//! Event delivery vocabulary: identifiers, reactor steps, reports and the
//! delivery policy that decides whether step failures are surfaced.
//!
//! The dispatcher delivers each document event at least once. Reactors break
//! their side effects into named steps so that an [`crate::domain::ports::EventLedger`]
//! can record completed steps per event and a redelivery only re-runs what is
//! still outstanding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;

/// Validation errors for [`EventId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventIdValidationError {
    /// The identifier was blank.
    #[error("event id must not be empty")]
    Empty,
}

/// Dispatcher-assigned identifier of one event, stable across redeliveries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub struct EventId(String);

impl EventId {
    /// Validate and construct an event identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, EventIdValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EventIdValidationError::Empty);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EventId> for String {
    fn from(value: EventId) -> Self {
        value.0
    }
}

impl TryFrom<String> for EventId {
    type Error = EventIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Named side-effect step performed by a reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReactorStep {
    /// Write default profile fields onto a new user.
    EnrichUser,
    /// Append the `user_created` analytics record.
    RecordSignupAnalytics,
    /// Bump the owner's `plantsAdded` counter.
    IncrementOwnerPlantCount,
    /// Backfill `createdAt`/`status` on a new plant.
    BackfillPlantMetadata,
    /// Observe a change of a message's likes.
    TrackLikes,
    /// Note a message crossing the likes milestone.
    LogLikesMilestone,
}

impl ReactorStep {
    /// Stable snake_case name, as serialised.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnrichUser => "enrich_user",
            Self::RecordSignupAnalytics => "record_signup_analytics",
            Self::IncrementOwnerPlantCount => "increment_owner_plant_count",
            Self::BackfillPlantMetadata => "backfill_plant_metadata",
            Self::TrackLikes => "track_likes",
            Self::LogLikesMilestone => "log_likes_milestone",
        }
    }
}

impl fmt::Display for ReactorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one step during one delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The side effect was written.
    Applied,
    /// A previous delivery of the same event already applied the step.
    SkippedAlreadyApplied,
    /// The snapshot did not call for this step.
    SkippedNotApplicable,
    /// The write failed transiently; a redelivery may succeed.
    Failed {
        /// Failure description.
        message: String,
    },
    /// The write can never succeed for this snapshot (missing target,
    /// invalid reference). Redelivering the event would not help.
    Rejected {
        /// Failure description.
        message: String,
    },
}

/// Outcome of one step, labelled with the step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StepReport {
    /// Step performed.
    pub step: ReactorStep,
    /// What happened.
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Per-delivery summary returned by every reactor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReactionReport {
    /// Event that was handled.
    pub event_id: EventId,
    /// `collection/id` of the triggering document.
    pub document: String,
    /// Step outcomes in execution order.
    pub steps: Vec<StepReport>,
}

impl ReactionReport {
    /// Start an empty report.
    #[must_use]
    pub fn new(event_id: EventId, document: impl Into<String>) -> Self {
        Self {
            event_id,
            document: document.into(),
            steps: Vec::new(),
        }
    }

    /// Record the outcome of `step`.
    pub fn push(&mut self, step: ReactorStep, outcome: StepOutcome) {
        self.steps.push(StepReport { step, outcome });
    }

    /// Outcome recorded for `step`, if it ran.
    #[must_use]
    pub fn outcome_of(&self, step: ReactorStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|report| report.step == step)
            .map(|report| &report.outcome)
    }

    /// Steps whose write failed transiently.
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|report| matches!(report.outcome, StepOutcome::Failed { .. }))
    }

    /// Steps whose write failed permanently.
    pub fn rejected_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|report| matches!(report.outcome, StepOutcome::Rejected { .. }))
    }

    /// Whether any step failed transiently.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed_steps().next().is_some()
    }

    /// Whether any step failed permanently.
    #[must_use]
    pub fn has_rejections(&self) -> bool {
        self.rejected_steps().next().is_some()
    }
}

/// Error raised when parsing a [`DeliveryPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown delivery policy '{0}'; expected acknowledge|retry")]
pub struct DeliveryPolicyParseError(String);

/// Whether failed reactor steps are hidden from, or surfaced to, the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Log failures and acknowledge the delivery. The dispatcher never
    /// retries, so a transient write failure loses that side effect.
    #[default]
    Acknowledge,
    /// Report transient failures as `UNAVAILABLE` so the dispatcher
    /// redelivers. Steps already claimed in the event ledger are skipped on
    /// redelivery. Rejected steps are acknowledged under both policies.
    Retry,
}

impl DeliveryPolicy {
    /// Turn a finished report into the dispatcher-facing result.
    ///
    /// # Examples
    /// ```
    /// use leafline::domain::{
    ///     DeliveryPolicy, EventId, ReactionReport, ReactorStep, StepOutcome,
    /// };
    ///
    /// let mut report = ReactionReport::new(EventId::new("evt-1").expect("id"), "users/u1");
    /// report.push(
    ///     ReactorStep::EnrichUser,
    ///     StepOutcome::Failed { message: "store offline".into() },
    /// );
    /// assert!(DeliveryPolicy::Acknowledge.settle(report.clone()).is_ok());
    /// assert!(DeliveryPolicy::Retry.settle(report).is_err());
    /// ```
    pub fn settle(self, report: ReactionReport) -> Result<ReactionReport, Error> {
        if matches!(self, Self::Acknowledge) || !report.has_failures() {
            return Ok(report);
        }
        let failed: Vec<&str> = report
            .failed_steps()
            .map(|failure| failure.step.as_str())
            .collect();
        Err(
            Error::unavailable(format!("event {} has failed steps", report.event_id)).with_details(
                json!({
                    "eventId": report.event_id.as_ref(),
                    "document": report.document,
                    "failedSteps": failed,
                }),
            ),
        )
    }
}

impl FromStr for DeliveryPolicy {
    type Err = DeliveryPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acknowledge" | "ack" => Ok(Self::Acknowledge),
            "retry" => Ok(Self::Retry),
            _ => Err(DeliveryPolicyParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};
    use serde_json::Value;

    #[fixture]
    fn report_with_failure() -> ReactionReport {
        let mut report = ReactionReport::new(EventId::new("evt-1").expect("id"), "plants/p1");
        report.push(ReactorStep::IncrementOwnerPlantCount, StepOutcome::Applied);
        report.push(
            ReactorStep::BackfillPlantMetadata,
            StepOutcome::Failed {
                message: "document store unavailable".to_owned(),
            },
        );
        report
    }

    #[rstest]
    fn event_id_rejects_blank_values() {
        assert_eq!(EventId::new("  "), Err(EventIdValidationError::Empty));
    }

    #[rstest]
    fn acknowledge_policy_hides_failures(report_with_failure: ReactionReport) {
        let settled = DeliveryPolicy::Acknowledge
            .settle(report_with_failure.clone())
            .expect("acknowledged");
        assert_eq!(settled, report_with_failure);
    }

    #[rstest]
    fn retry_policy_surfaces_failed_steps(report_with_failure: ReactionReport) {
        let error = DeliveryPolicy::Retry
            .settle(report_with_failure)
            .expect_err("failure surfaced");
        assert_eq!(error.code(), ErrorCode::Unavailable);
        let failed = error
            .details()
            .and_then(|details| details.get("failedSteps"))
            .and_then(Value::as_array)
            .expect("failed steps listed");
        assert_eq!(failed, &vec![Value::from("backfill_plant_metadata")]);
    }

    #[rstest]
    fn retry_policy_acknowledges_permanent_rejections() {
        let mut report = ReactionReport::new(EventId::new("evt-3").expect("id"), "plants/p1");
        report.push(
            ReactorStep::IncrementOwnerPlantCount,
            StepOutcome::Rejected {
                message: "invalid owner reference '7'".to_owned(),
            },
        );
        report.push(ReactorStep::BackfillPlantMetadata, StepOutcome::Applied);
        assert!(report.has_rejections());
        assert!(!report.has_failures());
        let settled = DeliveryPolicy::Retry.settle(report.clone()).expect("acknowledged");
        assert_eq!(settled, report);
    }

    #[rstest]
    fn retry_policy_passes_clean_reports() {
        let mut report = ReactionReport::new(EventId::new("evt-2").expect("id"), "users/u1");
        report.push(ReactorStep::EnrichUser, StepOutcome::SkippedAlreadyApplied);
        assert!(DeliveryPolicy::Retry.settle(report).is_ok());
    }

    #[rstest]
    #[case("acknowledge", DeliveryPolicy::Acknowledge)]
    #[case("ACK", DeliveryPolicy::Acknowledge)]
    #[case(" retry ", DeliveryPolicy::Retry)]
    fn parses_policy_names(#[case] raw: &str, #[case] expected: DeliveryPolicy) {
        assert_eq!(raw.parse::<DeliveryPolicy>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_policy_names() {
        assert!("sometimes".parse::<DeliveryPolicy>().is_err());
    }

    #[rstest]
    fn step_reports_serialise_flat(report_with_failure: ReactionReport) {
        let value = serde_json::to_value(&report_with_failure).expect("serialise report");
        assert_eq!(
            value,
            serde_json::json!({
                "eventId": "evt-1",
                "document": "plants/p1",
                "steps": [
                    {"step": "increment_owner_plant_count", "outcome": "applied"},
                    {
                        "step": "backfill_plant_metadata",
                        "outcome": "failed",
                        "message": "document store unavailable"
                    }
                ]
            })
        );
    }
}
