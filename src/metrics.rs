//! Workout block and session metrics
//!
//! Reduces a finished workout's block/set structure into volume, effort and
//! rest figures plus two composite scores:
//!
//! - Density: volume per minute of session time
//! - Intensity: density weighted by average effort, scaled by 100
//!
//! Averages are two-level: each block is averaged over its own sets first and
//! the workout averages the block results, so long blocks do not dominate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{WorkoutBlockRecord, WorkoutRecord, WorkoutRecordUpdate};
use crate::rounding::{mean, round_tenth, round_whole};

/// Score calculation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Effort factor used when no RPE was logged (default: 0.5)
    pub default_effort_factor: Decimal,

    /// Top of the RPE scale, maps avg RPE to an effort factor (default: 10)
    pub rpe_scale: Decimal,

    /// Display multiplier for the intensity score (default: 100)
    pub intensity_scale: Decimal,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            default_effort_factor: dec!(0.5),
            rpe_scale: dec!(10),
            intensity_scale: dec!(100),
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpe_scale <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "metrics.rpe_scale".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.default_effort_factor < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "metrics.default_effort_factor".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Per-block reduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetrics {
    pub block_id: String,
    pub volume: Decimal,
    pub avg_rpe: Option<Decimal>,
    pub avg_rest_sec: Option<Decimal>,
}

/// Workout-level reduction of all blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTotals {
    pub total_volume: Decimal,
    pub avg_rpe: Option<Decimal>,
    pub avg_rest_sec: Option<Decimal>,
    pub blocks: Vec<BlockMetrics>,
}

/// Computes block and workout metrics
pub struct WorkoutMetricsCalculator {
    config: MetricsConfig,
}

impl WorkoutMetricsCalculator {
    pub fn new() -> Self {
        WorkoutMetricsCalculator {
            config: MetricsConfig::default(),
        }
    }

    pub fn with_config(config: MetricsConfig) -> Self {
        WorkoutMetricsCalculator { config }
    }

    /// Σ weight × prescribed reps over completed sets with a positive weight.
    /// Without prescribed reps the block contributes no volume.
    pub fn block_volume(&self, block: &WorkoutBlockRecord) -> Decimal {
        let Some(reps) = block.prescribed_reps else {
            return Decimal::ZERO;
        };
        let reps = Decimal::from(reps);

        block
            .sets
            .iter()
            .filter(|s| s.completed)
            .filter_map(|s| s.weight)
            .filter(|w| *w > Decimal::ZERO)
            .map(|w| w * reps)
            .sum()
    }

    /// Mean RPE of completed sets, one decimal
    pub fn block_avg_rpe(&self, block: &WorkoutBlockRecord) -> Option<Decimal> {
        mean(
            block
                .sets
                .iter()
                .filter(|s| s.completed)
                .filter_map(|s| s.rpe),
        )
        .map(round_tenth)
    }

    /// Mean rest of completed sets in seconds, whole numbers
    pub fn block_avg_rest_sec(&self, block: &WorkoutBlockRecord) -> Option<Decimal> {
        mean(
            block
                .sets
                .iter()
                .filter(|s| s.completed)
                .filter_map(|s| s.rest_time_ms)
                .filter(|ms| *ms > 0)
                .map(|ms| Decimal::from(ms) / dec!(1000)),
        )
        .map(round_whole)
    }

    pub fn block_metrics(&self, block: &WorkoutBlockRecord) -> BlockMetrics {
        BlockMetrics {
            block_id: block.block_id.clone(),
            volume: self.block_volume(block),
            avg_rpe: self.block_avg_rpe(block),
            avg_rest_sec: self.block_avg_rest_sec(block),
        }
    }

    /// Sum block volumes and average the (already rounded) block averages
    pub fn workout_totals(&self, blocks: &[WorkoutBlockRecord]) -> WorkoutTotals {
        let blocks: Vec<BlockMetrics> = blocks.iter().map(|b| self.block_metrics(b)).collect();

        WorkoutTotals {
            total_volume: blocks.iter().map(|b| b.volume).sum(),
            avg_rpe: mean(blocks.iter().filter_map(|b| b.avg_rpe)).map(round_tenth),
            avg_rest_sec: mean(blocks.iter().filter_map(|b| b.avg_rest_sec)).map(round_whole),
            blocks,
        }
    }

    /// Volume per minute, one decimal; 0 for a zero-length session
    pub fn density_score(&self, total_volume: Decimal, duration_min: Decimal) -> Decimal {
        if duration_min <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        round_tenth(total_volume / duration_min)
    }

    /// Effort factor × volume per minute × 100, whole numbers; 0 for a
    /// zero-length session
    pub fn intensity_score(
        &self,
        total_volume: Decimal,
        duration_min: Decimal,
        avg_rpe: Option<Decimal>,
    ) -> Decimal {
        if duration_min <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        // an unvalidated zero scale falls back to the default factor
        let effort_factor = avg_rpe
            .and_then(|rpe| rpe.checked_div(self.config.rpe_scale))
            .unwrap_or(self.config.default_effort_factor);

        round_whole(effort_factor * (total_volume / duration_min) * self.config.intensity_scale)
    }

    /// Build the stored summary for a finished workout
    pub fn summarize(
        &self,
        id: impl Into<String>,
        date: NaiveDate,
        duration_min: Decimal,
        blocks: Vec<WorkoutBlockRecord>,
    ) -> WorkoutRecord {
        let id = id.into();
        let totals = self.workout_totals(&blocks);
        let density_score = self.density_score(totals.total_volume, duration_min);
        let intensity_score =
            self.intensity_score(totals.total_volume, duration_min, totals.avg_rpe);

        tracing::debug!(
            workout_id = %id,
            blocks = blocks.len(),
            total_volume = %totals.total_volume,
            density = %density_score,
            intensity = %intensity_score,
            "Summarized workout"
        );

        WorkoutRecord {
            id,
            date,
            duration_min,
            blocks,
            total_volume: totals.total_volume,
            avg_rpe: totals.avg_rpe,
            avg_rest_sec: totals.avg_rest_sec,
            density_score,
            intensity_score,
        }
    }

    /// New record with the overrides applied and every derived field recomputed
    pub fn apply_update(
        &self,
        record: &WorkoutRecord,
        update: WorkoutRecordUpdate,
    ) -> WorkoutRecord {
        self.summarize(
            record.id.clone(),
            record.date,
            update.duration_min.unwrap_or(record.duration_min),
            update.blocks.unwrap_or_else(|| record.blocks.clone()),
        )
    }
}

impl Default for WorkoutMetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutSetRecord;

    fn block(id: &str, reps: Option<u32>, sets: Vec<WorkoutSetRecord>) -> WorkoutBlockRecord {
        WorkoutBlockRecord {
            block_id: id.to_string(),
            title: format!("Block {}", id),
            block_type: "strength".to_string(),
            prescribed_sets: sets.len() as u32,
            prescribed_reps: reps,
            target_rpe: Some(dec!(8)),
            sets,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 23).unwrap()
    }

    #[test]
    fn test_block_volume_counts_completed_weighted_sets() {
        let calculator = WorkoutMetricsCalculator::new();
        let b = block(
            "b1",
            Some(5),
            vec![
                WorkoutSetRecord::completed(dec!(100)),
                WorkoutSetRecord::completed(dec!(105)),
                WorkoutSetRecord::completed(dec!(0)),
                WorkoutSetRecord::skipped(),
                WorkoutSetRecord {
                    completed: false,
                    weight: Some(dec!(110)),
                    rpe: None,
                    rest_time_ms: None,
                },
            ],
        );

        assert_eq!(calculator.block_volume(&b), dec!(1025));
    }

    #[test]
    fn test_block_volume_without_reps_is_zero() {
        let calculator = WorkoutMetricsCalculator::new();
        let b = block("b1", None, vec![WorkoutSetRecord::completed(dec!(50))]);
        assert_eq!(calculator.block_volume(&b), dec!(0));
    }

    #[test]
    fn test_block_averages() {
        let calculator = WorkoutMetricsCalculator::new();
        let b = block(
            "b1",
            Some(8),
            vec![
                WorkoutSetRecord::completed(dec!(60))
                    .with_rpe(dec!(7))
                    .with_rest_ms(90_000),
                WorkoutSetRecord::completed(dec!(60))
                    .with_rpe(dec!(7.5))
                    .with_rest_ms(95_500),
                WorkoutSetRecord::completed(dec!(60)).with_rest_ms(0),
                WorkoutSetRecord::completed(dec!(60)).with_rest_ms(-500),
                WorkoutSetRecord::skipped().with_rpe(dec!(10)).with_rest_ms(300_000),
            ],
        );

        // (7 + 7.5) / 2 = 7.25 -> 7.3
        assert_eq!(calculator.block_avg_rpe(&b), Some(dec!(7.3)));
        // (90 + 95.5) / 2 = 92.75 -> 93
        assert_eq!(calculator.block_avg_rest_sec(&b), Some(dec!(93)));
    }

    #[test]
    fn test_block_averages_absent() {
        let calculator = WorkoutMetricsCalculator::new();
        let b = block("b1", Some(5), vec![WorkoutSetRecord::completed(dec!(60))]);
        assert_eq!(calculator.block_avg_rpe(&b), None);
        assert_eq!(calculator.block_avg_rest_sec(&b), None);

        let empty = block("b2", Some(5), Vec::new());
        assert_eq!(calculator.block_volume(&empty), dec!(0));
        assert_eq!(calculator.block_avg_rpe(&empty), None);
    }

    #[test]
    fn test_workout_totals_average_blocks_not_sets() {
        let calculator = WorkoutMetricsCalculator::new();
        let heavy = block(
            "heavy",
            Some(3),
            vec![
                WorkoutSetRecord::completed(dec!(100)).with_rpe(dec!(9)).with_rest_ms(180_000),
                WorkoutSetRecord::completed(dec!(100)).with_rpe(dec!(9)).with_rest_ms(180_000),
                WorkoutSetRecord::completed(dec!(100)).with_rpe(dec!(9)).with_rest_ms(180_000),
                WorkoutSetRecord::completed(dec!(100)).with_rpe(dec!(9)).with_rest_ms(180_000),
            ],
        );
        let light = block(
            "light",
            Some(12),
            vec![WorkoutSetRecord::completed(dec!(20)).with_rpe(dec!(6)).with_rest_ms(60_000)],
        );
        let unrated = block("mobility", None, vec![WorkoutSetRecord::completed(dec!(10))]);

        let totals = calculator.workout_totals(&[heavy, light, unrated]);
        assert_eq!(totals.total_volume, dec!(1440));
        // (9 + 6) / 2, not (9*4 + 6) / 5
        assert_eq!(totals.avg_rpe, Some(dec!(7.5)));
        assert_eq!(totals.avg_rest_sec, Some(dec!(120)));
        assert_eq!(totals.blocks.len(), 3);
        assert_eq!(totals.blocks[2].volume, dec!(0));
    }

    #[test]
    fn test_scores_zero_for_zero_duration() {
        let calculator = WorkoutMetricsCalculator::new();
        assert_eq!(calculator.density_score(dec!(5000), dec!(0)), dec!(0));
        assert_eq!(calculator.intensity_score(dec!(5000), dec!(0), Some(dec!(8))), dec!(0));
        assert_eq!(calculator.intensity_score(dec!(5000), dec!(0), None), dec!(0));
    }

    #[test]
    fn test_density_and_intensity() {
        let calculator = WorkoutMetricsCalculator::new();

        // 5000 / 45 = 111.11 -> 111.1
        assert_eq!(calculator.density_score(dec!(5000), dec!(45)), dec!(111.1));
        // 0.8 * 111.11 * 100 = 8888.9 -> 8889
        assert_eq!(
            calculator.intensity_score(dec!(5000), dec!(45), Some(dec!(8))),
            dec!(8889)
        );
        // default effort factor 0.5: 0.5 * 100 * 100 = 5000
        assert_eq!(calculator.intensity_score(dec!(6000), dec!(60), None), dec!(5000));
    }

    #[test]
    fn test_summarize() {
        let calculator = WorkoutMetricsCalculator::new();
        let blocks = vec![block(
            "b1",
            Some(5),
            vec![
                WorkoutSetRecord::completed(dec!(100)).with_rpe(dec!(8)).with_rest_ms(120_000),
                WorkoutSetRecord::completed(dec!(100)).with_rpe(dec!(8)).with_rest_ms(120_000),
            ],
        )];

        let record = calculator.summarize("w1", date(), dec!(50), blocks);
        assert_eq!(record.total_volume, dec!(1000));
        assert_eq!(record.avg_rpe, Some(dec!(8)));
        assert_eq!(record.avg_rest_sec, Some(dec!(120)));
        assert_eq!(record.density_score, dec!(20));
        assert_eq!(record.intensity_score, dec!(1600));
    }

    #[test]
    fn test_summarize_sparse_workout() {
        let calculator = WorkoutMetricsCalculator::new();
        let record = calculator.summarize("w0", date(), dec!(0), Vec::new());

        assert_eq!(record.total_volume, dec!(0));
        assert_eq!(record.avg_rpe, None);
        assert_eq!(record.avg_rest_sec, None);
        assert_eq!(record.density_score, dec!(0));
        assert_eq!(record.intensity_score, dec!(0));
    }

    #[test]
    fn test_apply_update_rederives_scores() {
        let calculator = WorkoutMetricsCalculator::new();
        let blocks = vec![block("b1", Some(10), vec![WorkoutSetRecord::completed(dec!(50))])];
        let original = calculator.summarize("w1", date(), dec!(10), blocks);
        assert_eq!(original.density_score, dec!(50));

        let updated = calculator.apply_update(
            &original,
            WorkoutRecordUpdate {
                duration_min: Some(dec!(20)),
                ..WorkoutRecordUpdate::default()
            },
        );

        assert_eq!(updated.density_score, dec!(25));
        assert_eq!(updated.blocks, original.blocks);
        // original untouched
        assert_eq!(original.duration_min, dec!(10));
    }

    #[test]
    fn test_config_validation() {
        assert!(MetricsConfig::default().validate().is_ok());
        let config = MetricsConfig {
            rpe_scale: dec!(0),
            ..MetricsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_rpe_scale_uses_default_effort() {
        let calculator = WorkoutMetricsCalculator::with_config(MetricsConfig {
            rpe_scale: dec!(0),
            ..MetricsConfig::default()
        });

        // 0.5 x 1000 / 50 x 100
        assert_eq!(
            calculator.intensity_score(dec!(1000), dec!(50), Some(dec!(8))),
            dec!(1000)
        );
    }
}
