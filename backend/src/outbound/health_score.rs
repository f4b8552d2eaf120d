//! Random stand-in health scores.

use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::domain::HealthScore;
use crate::domain::ports::HealthScoreSource;

/// Draws scores uniformly from `[HealthScore::MIN, HealthScore::MAX]`.
pub struct RandomHealthScoreSource {
    rng: Mutex<SmallRng>,
}

impl RandomHealthScoreSource {
    /// Seed from operating system entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Deterministic source for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl HealthScoreSource for RandomHealthScoreSource {
    fn next_score(&self) -> HealthScore {
        let raw = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(HealthScore::MIN..=HealthScore::MAX),
            // A poisoned generator still yields a valid, if constant, score.
            Err(_) => HealthScore::MIN,
        };
        HealthScore::new(raw).unwrap_or(HealthScore::MIN_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn scores_stay_within_bounds() {
        let source = RandomHealthScoreSource::seeded(7);
        for _ in 0..500 {
            let score = source.next_score().value();
            assert!((HealthScore::MIN..=HealthScore::MAX).contains(&score), "{score}");
        }
    }

    #[rstest]
    fn seeded_sources_repeat() {
        let first = RandomHealthScoreSource::seeded(42);
        let second = RandomHealthScoreSource::seeded(42);
        let a: Vec<_> = (0..10).map(|_| first.next_score()).collect();
        let b: Vec<_> = (0..10).map(|_| second.next_score()).collect();
        assert_eq!(a, b);
    }

    #[rstest]
    fn both_bounds_are_reachable() {
        let source = RandomHealthScoreSource::seeded(1);
        let scores: Vec<u8> = (0..5_000).map(|_| source.next_score().value()).collect();
        assert!(scores.contains(&HealthScore::MIN));
        assert!(scores.contains(&HealthScore::MAX));
    }
}
