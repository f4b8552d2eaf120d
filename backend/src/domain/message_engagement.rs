//! Observation of like counts on updated messages. Nothing is written.

use serde_json::Value;
use tracing::info;

use crate::domain::{
    DocumentFields, DocumentId, DocumentPath, EventId, ReactionReport, ReactorStep, StepOutcome,
};

/// Like count whose crossing is celebrated.
pub const LIKES_MILESTONE: i64 = 10;

/// Likes before and after one message update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikesChange {
    before: Option<i64>,
    after: Option<i64>,
}

impl LikesChange {
    /// Pair raw like counts.
    #[must_use]
    pub const fn new(before: Option<i64>, after: Option<i64>) -> Self {
        Self { before, after }
    }

    /// Read `likes` from both snapshots; non-integer values count as absent.
    #[must_use]
    pub fn from_snapshots(before: &DocumentFields, after: &DocumentFields) -> Self {
        Self::new(
            before.get("likes").and_then(Value::as_i64),
            after.get("likes").and_then(Value::as_i64),
        )
    }

    /// Whether the update touched `likes`.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.before != self.after
    }

    /// Whether the update carried the count across [`LIKES_MILESTONE`].
    ///
    /// # Examples
    /// ```
    /// use leafline::domain::LikesChange;
    ///
    /// assert!(LikesChange::new(Some(9), Some(10)).milestone_reached());
    /// assert!(!LikesChange::new(Some(10), Some(11)).milestone_reached());
    /// assert!(!LikesChange::new(None, Some(12)).milestone_reached());
    /// ```
    #[must_use]
    pub fn milestone_reached(&self) -> bool {
        matches!(
            (self.before, self.after),
            (Some(before), Some(after)) if after >= LIKES_MILESTONE && before < LIKES_MILESTONE
        )
    }
}

/// Reactor for `messages/{id}` update events.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageEngagementReactor;

impl MessageEngagementReactor {
    /// Handle one delivery of a message update.
    #[must_use]
    pub fn react(
        &self,
        event_id: EventId,
        message_id: &DocumentId,
        change: LikesChange,
    ) -> ReactionReport {
        let path = DocumentPath::message(message_id.clone());
        let mut report = ReactionReport::new(event_id, path.to_string());
        if !change.changed() {
            report.push(ReactorStep::TrackLikes, StepOutcome::SkippedNotApplicable);
            report.push(ReactorStep::LogLikesMilestone, StepOutcome::SkippedNotApplicable);
            return report;
        }
        info!(
            message_id = %message_id,
            before = ?change.before,
            after = ?change.after,
            "message likes changed"
        );
        report.push(ReactorStep::TrackLikes, StepOutcome::Applied);
        if change.milestone_reached() {
            info!(message_id = %message_id, milestone = LIKES_MILESTONE, "message reached likes milestone");
            report.push(ReactorStep::LogLikesMilestone, StepOutcome::Applied);
        } else {
            report.push(ReactorStep::LogLikesMilestone, StepOutcome::SkippedNotApplicable);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn likes_went_from_nine_to_ten() -> LikesChange {
        let before = json!({"likes": 9});
        let after = json!({"likes": 10, "text": "hello"});
        LikesChange::from_snapshots(
            before.as_object().expect("object"),
            after.as_object().expect("object"),
        )
    }

    fn the_reactor_observes(change: LikesChange) -> ReactionReport {
        MessageEngagementReactor.react(
            EventId::new("evt-msg-1").expect("valid id"),
            &DocumentId::new("m1").expect("valid id"),
            change,
        )
    }

    fn the_milestone_is_logged(report: ReactionReport) {
        assert_eq!(
            report.outcome_of(ReactorStep::LogLikesMilestone),
            Some(&StepOutcome::Applied)
        );
        assert_eq!(report.document, "messages/m1");
    }

    #[rstest]
    fn crossing_ten_likes_logs_the_milestone() {
        let change = likes_went_from_nine_to_ten();
        let report = the_reactor_observes(change);
        the_milestone_is_logged(report);
    }

    #[rstest]
    #[case(Some(9), Some(10), true, true)]
    #[case(Some(10), Some(11), true, false)]
    #[case(Some(5), Some(5), false, false)]
    #[case(None, Some(10), true, false)]
    #[case(Some(3), None, true, false)]
    #[case(Some(2), Some(40), true, true)]
    fn likes_transitions(
        #[case] before: Option<i64>,
        #[case] after: Option<i64>,
        #[case] tracked: bool,
        #[case] milestone: bool,
    ) {
        let report = MessageEngagementReactor.react(
            EventId::new("evt").expect("valid id"),
            &DocumentId::new("m1").expect("valid id"),
            LikesChange::new(before, after),
        );
        let applied = |step| report.outcome_of(step) == Some(&StepOutcome::Applied);
        assert_eq!(applied(ReactorStep::TrackLikes), tracked);
        assert_eq!(applied(ReactorStep::LogLikesMilestone), milestone);
        assert!(!report.has_failures());
    }
}
