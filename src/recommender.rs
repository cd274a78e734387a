//! Next-session working weight recommendation
//!
//! The most recent logged set is the starting point. Two multiplicative
//! adjustments follow in a fixed order:
//!
//! 1. Effort: last RPE compared against the target RPE, with a dead band of
//!    +/- `rpe_tolerance` (exclusive) where nothing changes.
//! 2. Recovery: a low readiness score de-loads, a high one allows a small bump.
//!
//! The compounded weight is then clamped to `min_weight` and rounded to the
//! nearest `weight_increment`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::most_recent_first;
use crate::models::ExerciseHistoryEntry;
use crate::rounding::round_to_increment;

/// Recommendation rule constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Lowest weight ever recommended (default: 45)
    pub min_weight: Decimal,

    /// Smallest practical load step (default: 2.5)
    pub weight_increment: Decimal,

    /// Half-width of the RPE dead band (default: 1)
    pub rpe_tolerance: Decimal,

    /// Multiplier when the last session felt easier than targeted
    pub easy_session_factor: Decimal,

    /// Multiplier when the last session felt harder than targeted
    pub hard_session_factor: Decimal,

    /// Recovery scores below this de-load (default: 40)
    pub low_recovery_threshold: Decimal,

    /// Recovery scores above this allow an increase (default: 85)
    pub high_recovery_threshold: Decimal,

    pub low_recovery_factor: Decimal,

    pub high_recovery_factor: Decimal,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        RecommenderConfig {
            min_weight: dec!(45),
            weight_increment: dec!(2.5),
            rpe_tolerance: dec!(1),
            easy_session_factor: dec!(1.05),
            hard_session_factor: dec!(0.95),
            low_recovery_threshold: dec!(40),
            high_recovery_threshold: dec!(85),
            low_recovery_factor: dec!(0.95),
            high_recovery_factor: dec!(1.025),
        }
    }
}

impl RecommenderConfig {
    /// Check that the constants describe a usable rule set
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: format!("recommender.{}", field),
            reason: reason.to_string(),
        };

        if self.weight_increment <= Decimal::ZERO {
            return Err(invalid("weight_increment", "must be positive"));
        }
        if self.min_weight < Decimal::ZERO {
            return Err(invalid("min_weight", "must not be negative"));
        }
        if self.rpe_tolerance < Decimal::ZERO {
            return Err(invalid("rpe_tolerance", "must not be negative"));
        }
        if self.low_recovery_threshold > self.high_recovery_threshold {
            return Err(invalid(
                "low_recovery_threshold",
                "must not exceed high_recovery_threshold",
            ));
        }

        let factors = [
            ("easy_session_factor", self.easy_session_factor),
            ("hard_session_factor", self.hard_session_factor),
            ("low_recovery_factor", self.low_recovery_factor),
            ("high_recovery_factor", self.high_recovery_factor),
        ];
        for (field, factor) in factors {
            if factor <= Decimal::ZERO {
                return Err(invalid(field, "must be positive"));
            }
        }

        Ok(())
    }
}

/// One step applied on top of the last logged weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    /// Last session felt meaningfully easier than targeted
    EffortIncrease { rpe_diff: Decimal, factor: Decimal },
    /// Last session felt meaningfully harder than targeted
    EffortDecrease { rpe_diff: Decimal, factor: Decimal },
    /// Low recovery score
    RecoveryDeload { score: Decimal, factor: Decimal },
    /// High recovery score
    RecoveryBoost { score: Decimal, factor: Decimal },
    /// Result fell under the minimum weight
    FloorApplied { floor: Decimal },
}

impl Adjustment {
    pub fn description(&self) -> String {
        match self {
            Adjustment::EffortIncrease { rpe_diff, factor } => format!(
                "Last session was easier than planned (RPE {}), x{}",
                rpe_diff, factor
            ),
            Adjustment::EffortDecrease { rpe_diff, factor } => format!(
                "Last session was harder than planned (RPE +{}), x{}",
                rpe_diff, factor
            ),
            Adjustment::RecoveryDeload { score, factor } => {
                format!("Recovery score {} is low, x{}", score, factor)
            }
            Adjustment::RecoveryBoost { score, factor } => {
                format!("Recovery score {} is high, x{}", score, factor)
            }
            Adjustment::FloorApplied { floor } => format!("Raised to the {} minimum", floor),
        }
    }
}

/// A recommended weight with the steps that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub exercise_id: String,

    /// Weight of the most recent logged set
    pub base_weight: Decimal,

    /// Final, rounded recommendation
    pub weight: Decimal,

    pub adjustments: Vec<Adjustment>,
}

/// Computes the next working weight from raw exercise history
pub struct WeightRecommender {
    config: RecommenderConfig,
}

impl WeightRecommender {
    /// Create new recommender with default configuration
    pub fn new() -> Self {
        WeightRecommender {
            config: RecommenderConfig::default(),
        }
    }

    /// Create new recommender with custom configuration
    pub fn with_config(config: RecommenderConfig) -> Self {
        WeightRecommender { config }
    }

    /// Recommended weight, `None` when there is no history to base it on
    pub fn recommend(
        &self,
        exercise_id: &str,
        target_rpe: Option<Decimal>,
        recovery_score: Option<Decimal>,
        history: &[ExerciseHistoryEntry],
    ) -> Option<Decimal> {
        self.explain(exercise_id, target_rpe, recovery_score, history)
            .map(|r| r.weight)
    }

    /// Same as [`recommend`](Self::recommend), keeping the applied adjustments
    pub fn explain(
        &self,
        exercise_id: &str,
        target_rpe: Option<Decimal>,
        recovery_score: Option<Decimal>,
        history: &[ExerciseHistoryEntry],
    ) -> Option<Recommendation> {
        // min_by keeps the first of equal elements, matching a stable sort
        let last = history.iter().min_by(|a, b| most_recent_first(a, b))?;

        let mut adjustments = Vec::new();
        let mut weight = last.weight;

        if let (Some(target), Some(rpe)) = (target_rpe, last.rpe) {
            let rpe_diff = rpe - target;
            if rpe_diff < -self.config.rpe_tolerance {
                weight *= self.config.easy_session_factor;
                adjustments.push(Adjustment::EffortIncrease {
                    rpe_diff,
                    factor: self.config.easy_session_factor,
                });
            } else if rpe_diff > self.config.rpe_tolerance {
                weight *= self.config.hard_session_factor;
                adjustments.push(Adjustment::EffortDecrease {
                    rpe_diff,
                    factor: self.config.hard_session_factor,
                });
            }
        }

        if let Some(score) = recovery_score {
            if score < self.config.low_recovery_threshold {
                weight *= self.config.low_recovery_factor;
                adjustments.push(Adjustment::RecoveryDeload {
                    score,
                    factor: self.config.low_recovery_factor,
                });
            } else if score > self.config.high_recovery_threshold {
                weight *= self.config.high_recovery_factor;
                adjustments.push(Adjustment::RecoveryBoost {
                    score,
                    factor: self.config.high_recovery_factor,
                });
            }
        }

        if weight < self.config.min_weight {
            weight = self.config.min_weight;
            adjustments.push(Adjustment::FloorApplied {
                floor: self.config.min_weight,
            });
        }

        let weight = round_to_increment(weight, self.config.weight_increment);

        tracing::debug!(
            exercise_id,
            session_id = %last.session_id,
            base_weight = %last.weight,
            recommended = %weight,
            adjustments = adjustments.len(),
            "Computed weight recommendation"
        );

        Some(Recommendation {
            exercise_id: exercise_id.to_string(),
            base_weight: last.weight,
            weight,
            adjustments,
        })
    }
}

impl Default for WeightRecommender {
    fn default() -> Self {
        Self::new()
    }
}
