use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One logged set of one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseHistoryEntry {
    /// Catalog identifier of the exercise
    pub exercise_id: String,

    /// Calendar day the set was performed
    pub date: NaiveDate,

    /// Groups sets performed together in one training occasion
    pub session_id: String,

    /// Load lifted, in the application's default unit
    pub weight: Decimal,

    /// Rate of Perceived Exertion (1-10), if logged
    #[serde(default)]
    pub rpe: Option<Decimal>,

    /// Mechanical work proxy for the set (weight x reps)
    #[serde(default)]
    pub volume: Decimal,
}

impl ExerciseHistoryEntry {
    pub fn new(
        exercise_id: impl Into<String>,
        date: NaiveDate,
        session_id: impl Into<String>,
        weight: Decimal,
    ) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            date,
            session_id: session_id.into(),
            weight,
            rpe: None,
            volume: Decimal::ZERO,
        }
    }

    pub fn with_rpe(mut self, rpe: Decimal) -> Self {
        self.rpe = Some(rpe);
        self
    }

    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = volume;
        self
    }
}

/// One training session's summary for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAggregate {
    pub session_id: String,

    /// Latest entry date within the session
    pub date: NaiveDate,

    /// Number of logged sets in the session
    pub entry_count: usize,

    /// Arithmetic mean of the logged weights
    pub avg_weight: Decimal,

    /// Mean RPE over the entries that logged one
    pub avg_rpe: Option<Decimal>,

    /// Sum of per-set volume
    pub total_volume: Decimal,
}

/// One set within a workout block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSetRecord {
    pub completed: bool,

    #[serde(default)]
    pub weight: Option<Decimal>,

    #[serde(default)]
    pub rpe: Option<Decimal>,

    /// Rest taken after the set, in milliseconds
    #[serde(default)]
    pub rest_time_ms: Option<i64>,
}

impl WorkoutSetRecord {
    /// A completed set with the given load and nothing else logged
    pub fn completed(weight: Decimal) -> Self {
        Self {
            completed: true,
            weight: Some(weight),
            rpe: None,
            rest_time_ms: None,
        }
    }

    /// A prescribed set that was not performed
    pub fn skipped() -> Self {
        Self {
            completed: false,
            weight: None,
            rpe: None,
            rest_time_ms: None,
        }
    }

    pub fn with_rpe(mut self, rpe: Decimal) -> Self {
        self.rpe = Some(rpe);
        self
    }

    pub fn with_rest_ms(mut self, rest_time_ms: i64) -> Self {
        self.rest_time_ms = Some(rest_time_ms);
        self
    }
}

/// One prescribed exercise block in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutBlockRecord {
    pub block_id: String,

    pub title: String,

    /// Block category as authored by the program (e.g. "strength", "accessory")
    #[serde(rename = "type")]
    pub block_type: String,

    pub prescribed_sets: u32,

    /// Rep count applied uniformly to every completed set
    #[serde(default)]
    pub prescribed_reps: Option<u32>,

    #[serde(default)]
    pub target_rpe: Option<Decimal>,

    #[serde(default)]
    pub sets: Vec<WorkoutSetRecord>,
}

/// One completed workout with its derived summary metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,

    pub date: NaiveDate,

    /// Session length in minutes
    pub duration_min: Decimal,

    pub blocks: Vec<WorkoutBlockRecord>,

    pub total_volume: Decimal,

    pub avg_rpe: Option<Decimal>,

    pub avg_rest_sec: Option<Decimal>,

    /// Volume per minute
    pub density_score: Decimal,

    /// Effort-weighted density, scaled for display
    pub intensity_score: Decimal,
}

/// Named overrides applied to a stored workout.
///
/// Derived fields are absent on purpose: applying an update re-derives them
/// (see `WorkoutMetricsCalculator::apply_update`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecordUpdate {
    pub duration_min: Option<Decimal>,
    pub blocks: Option<Vec<WorkoutBlockRecord>>,
}

/// Chart point for RPE, volume and workout score series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date_label: String,
    pub value: Decimal,
}

/// Chart point for the weight series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightTrendPoint {
    pub date_label: String,
    pub weight: Decimal,
}
