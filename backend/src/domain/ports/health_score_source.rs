//! Port supplying the stand-in plant health score.
//!
//! The score is not derived from the request; it is a placeholder value until a
//! real health model exists. Keeping it behind a port makes the processor
//! deterministic under test.

use crate::domain::HealthScore;

/// Source of health scores in `[HealthScore::MIN, HealthScore::MAX]`.
#[cfg_attr(test, mockall::automock)]
pub trait HealthScoreSource: Send + Sync {
    /// Draw the next score.
    fn next_score(&self) -> HealthScore;
}

/// Fixture source that always returns the same score.
#[derive(Debug, Clone, Copy)]
pub struct FixtureHealthScoreSource(pub HealthScore);

impl Default for FixtureHealthScoreSource {
    fn default() -> Self {
        Self(HealthScore::MIN_SCORE)
    }
}

impl HealthScoreSource for FixtureHealthScoreSource {
    fn next_score(&self) -> HealthScore {
        self.0
    }
}
