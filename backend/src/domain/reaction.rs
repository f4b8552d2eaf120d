//! Ledger-guarded execution of reactor steps.
//!
//! A [`StepRunner`] walks one delivery through its steps. Before each write
//! step it claims the step in the [`EventLedger`]; a step claimed by an
//! earlier or overlapping delivery is skipped. A failed write releases its
//! claim and becomes [`StepOutcome::Failed`] when the store error is
//! transient, or [`StepOutcome::Rejected`] when retrying cannot help.
//! Failures never abort the remaining steps.

use std::future::Future;

use tracing::{error, info, warn};

use crate::domain::ports::{DocumentStoreError, EventLedger};
use crate::domain::{EventId, ReactionReport, ReactorStep, StepOutcome};

/// Accumulates step outcomes for one event delivery.
pub struct StepRunner<'a> {
    ledger: &'a dyn EventLedger,
    report: ReactionReport,
}

impl<'a> StepRunner<'a> {
    /// Start a delivery of `event_id` against the document at `document`.
    pub fn new(ledger: &'a dyn EventLedger, event_id: EventId, document: impl Into<String>) -> Self {
        Self {
            ledger,
            report: ReactionReport::new(event_id, document),
        }
    }

    fn event_id(&self) -> &EventId {
        &self.report.event_id
    }

    /// Run `write` for `step` unless another delivery already claimed it.
    pub async fn run<F, Fut>(&mut self, step: ReactorStep, write: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), DocumentStoreError>>,
    {
        let outcome = match self.ledger.try_claim(self.event_id(), step).await {
            Err(err) => {
                error!(
                    event_id = %self.event_id(),
                    step = %step,
                    error = %err,
                    "reactor step failed: ledger claim"
                );
                StepOutcome::Failed {
                    message: err.to_string(),
                }
            }
            Ok(false) => {
                info!(event_id = %self.event_id(), step = %step, "step already claimed; skipping");
                StepOutcome::SkippedAlreadyApplied
            }
            Ok(true) => self.apply(step, write).await,
        };
        self.report.push(step, outcome);
    }

    async fn apply<F, Fut>(&self, step: ReactorStep, write: F) -> StepOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), DocumentStoreError>>,
    {
        let Err(err) = write().await else {
            return StepOutcome::Applied;
        };
        // Unclaimed again so a redelivery retries the step.
        if let Err(release_err) = self.ledger.release(self.event_id(), step).await {
            warn!(
                event_id = %self.event_id(),
                step = %step,
                error = %release_err,
                "failed step could not be released"
            );
        }
        let message = err.to_string();
        if err.is_transient() {
            error!(
                event_id = %self.event_id(),
                step = %step,
                error = %err,
                "reactor step failed: write"
            );
            StepOutcome::Failed { message }
        } else {
            warn!(
                event_id = %self.event_id(),
                step = %step,
                error = %err,
                "reactor step rejected; redelivery cannot apply it"
            );
            StepOutcome::Rejected { message }
        }
    }

    /// Record a step that performs no write and needs no ledger entry.
    pub fn observe(&mut self, step: ReactorStep, applies: bool) {
        let outcome = if applies {
            StepOutcome::Applied
        } else {
            StepOutcome::SkippedNotApplicable
        };
        self.report.push(step, outcome);
    }

    /// Record that `step` can never apply to this snapshot.
    pub fn reject(&mut self, step: ReactorStep, message: impl Into<String>) {
        let message = message.into();
        warn!(
            event_id = %self.event_id(),
            step = %step,
            reason = %message,
            "reactor step rejected; redelivery cannot apply it"
        );
        self.report.push(step, StepOutcome::Rejected { message });
    }

    /// Record that the snapshot does not call for `step`.
    pub fn skip(&mut self, step: ReactorStep) {
        self.observe(step, false);
    }

    /// Finish the delivery.
    #[must_use]
    pub fn finish(self) -> ReactionReport {
        self.report
    }
}
