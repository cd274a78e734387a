//! Session aggregation and chart trend series
//!
//! Raw per-set history is grouped into sessions and reduced to fixed-length,
//! oldest-to-newest series. Every function here is pure: inputs are borrowed
//! and never reordered in place.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::catalog::ExerciseCatalog;
use crate::labels::date_label;
use crate::models::{
    ExerciseHistoryEntry, SessionAggregate, TrendPoint, WeightTrendPoint, WorkoutRecord,
};
use crate::rounding::{mean, round_tenth, round_whole};

/// Trend series configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Maximum number of points in a chart series (default: 10)
    pub max_points: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig { max_points: 10 }
    }
}

/// Stored-workout metric to chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutScore {
    Volume,
    Density,
    Intensity,
}

impl FromStr for WorkoutScore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "volume" => Ok(WorkoutScore::Volume),
            "density" => Ok(WorkoutScore::Density),
            "intensity" => Ok(WorkoutScore::Intensity),
            _ => Err(format!("Invalid workout score: {}", s)),
        }
    }
}

/// "Most recent first" ordering: date descending, then session id descending
pub fn most_recent_first(a: &ExerciseHistoryEntry, b: &ExerciseHistoryEntry) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.session_id.cmp(&a.session_id))
}

fn session_most_recent_first(a: &SessionAggregate, b: &SessionAggregate) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.session_id.cmp(&a.session_id))
}

/// Groups history into sessions and builds chart series
pub struct HistoryAggregator {
    config: TrendConfig,
}

impl HistoryAggregator {
    /// Create new aggregator with default configuration
    pub fn new() -> Self {
        HistoryAggregator {
            config: TrendConfig::default(),
        }
    }

    /// Create new aggregator with custom configuration
    pub fn with_config(config: TrendConfig) -> Self {
        HistoryAggregator { config }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Distinct exercise display names, sorted ascending
    pub fn list_exercises<C>(&self, entries: &[ExerciseHistoryEntry], catalog: &C) -> Vec<String>
    where
        C: ExerciseCatalog + ?Sized,
    {
        let ids: BTreeSet<&str> = entries.iter().map(|e| e.exercise_id.as_str()).collect();

        let names: BTreeSet<String> = ids
            .into_iter()
            .map(|id| catalog.resolve_name_by_id(id))
            .collect();

        names.into_iter().collect()
    }

    /// Full history of one exercise, most recent first.
    ///
    /// An unknown name yields an empty list.
    pub fn history_for_exercise<C>(
        &self,
        entries: &[ExerciseHistoryEntry],
        name: &str,
        catalog: &C,
    ) -> Vec<ExerciseHistoryEntry>
    where
        C: ExerciseCatalog + ?Sized,
    {
        let Some(exercise_id) = catalog.resolve_id_by_name(name) else {
            tracing::debug!(name, "Exercise name not found in catalog");
            return Vec::new();
        };

        let mut history: Vec<ExerciseHistoryEntry> = entries
            .iter()
            .filter(|e| e.exercise_id == exercise_id)
            .cloned()
            .collect();

        history.sort_by(most_recent_first);
        history
    }

    /// Reduce entries to one aggregate per session, most recent first
    pub fn aggregate_sessions(&self, entries: &[ExerciseHistoryEntry]) -> Vec<SessionAggregate> {
        let mut sessions: BTreeMap<&str, Vec<&ExerciseHistoryEntry>> = BTreeMap::new();
        for entry in entries {
            sessions
                .entry(entry.session_id.as_str())
                .or_default()
                .push(entry);
        }

        let mut aggregates: Vec<SessionAggregate> = sessions
            .into_iter()
            .filter_map(|(session_id, members)| Self::reduce_session(session_id, &members))
            .collect();

        aggregates.sort_by(session_most_recent_first);

        tracing::trace!(
            entries = entries.len(),
            sessions = aggregates.len(),
            "Aggregated history into sessions"
        );

        aggregates
    }

    fn reduce_session(
        session_id: &str,
        members: &[&ExerciseHistoryEntry],
    ) -> Option<SessionAggregate> {
        let date = members.iter().map(|e| e.date).max()?;

        Some(SessionAggregate {
            session_id: session_id.to_string(),
            date,
            entry_count: members.len(),
            avg_weight: mean(members.iter().map(|e| e.weight)).unwrap_or(Decimal::ZERO),
            avg_rpe: mean(members.iter().filter_map(|e| e.rpe)),
            total_volume: members.iter().map(|e| e.volume).sum(),
        })
    }

    /// Take the newest `max_points` of a most-recent-first list and flip it to
    /// oldest-to-newest
    fn chart_window<T>(&self, most_recent_first: Vec<T>) -> Vec<T> {
        let mut window: Vec<T> = most_recent_first
            .into_iter()
            .take(self.config.max_points)
            .collect();
        window.reverse();
        window
    }

    /// Sessions that appear on the charts, oldest to newest
    pub fn recent_sessions(&self, entries: &[ExerciseHistoryEntry]) -> Vec<SessionAggregate> {
        self.chart_window(self.aggregate_sessions(entries))
    }

    /// Mean session weight, one decimal
    pub fn weight_trend(
        &self,
        entries: &[ExerciseHistoryEntry],
        today: NaiveDate,
    ) -> Vec<WeightTrendPoint> {
        self.recent_sessions(entries)
            .into_iter()
            .map(|s| WeightTrendPoint {
                date_label: date_label(s.date, today),
                weight: round_tenth(s.avg_weight),
            })
            .collect()
    }

    /// Mean session RPE, one decimal. Covers the same sessions as the weight
    /// and volume charts; unrated sessions in that window have no point.
    pub fn rpe_trend(&self, entries: &[ExerciseHistoryEntry], today: NaiveDate) -> Vec<TrendPoint> {
        self.recent_sessions(entries)
            .into_iter()
            .filter_map(|s| {
                s.avg_rpe.map(|rpe| TrendPoint {
                    date_label: date_label(s.date, today),
                    value: round_tenth(rpe),
                })
            })
            .collect()
    }

    /// Total session volume, whole numbers
    pub fn volume_trend(
        &self,
        entries: &[ExerciseHistoryEntry],
        today: NaiveDate,
    ) -> Vec<TrendPoint> {
        self.recent_sessions(entries)
            .into_iter()
            .map(|s| TrendPoint {
                date_label: date_label(s.date, today),
                value: round_whole(s.total_volume),
            })
            .collect()
    }

    /// Chart a derived score of stored workouts, oldest to newest
    pub fn workout_score_trend(
        &self,
        records: &[WorkoutRecord],
        score: WorkoutScore,
        today: NaiveDate,
    ) -> Vec<TrendPoint> {
        let mut ordered: Vec<&WorkoutRecord> = records.iter().collect();
        ordered.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));

        self.chart_window(ordered)
            .into_iter()
            .map(|record| TrendPoint {
                date_label: date_label(record.date, today),
                value: match score {
                    WorkoutScore::Volume => round_whole(record.total_volume),
                    WorkoutScore::Density => record.density_score,
                    WorkoutScore::Intensity => record.intensity_score,
                },
            })
            .collect()
    }
}

impl Default for HistoryAggregator {
    fn default() -> Self {
        Self::new()
    }
}
