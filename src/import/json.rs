use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::import::{extension_of, ImportFormat};
use crate::metrics::WorkoutMetricsCalculator;
use crate::models::{ExerciseHistoryEntry, WorkoutBlockRecord, WorkoutRecord};

const FORMAT: &str = "JSON";

/// Reads history exported by the app as a JSON array of entries
pub struct JsonImporter;

impl JsonImporter {
    pub fn new() -> Self {
        JsonImporter
    }
}

impl Default for JsonImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for JsonImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        extension_of(file_path).as_deref() == Some("json")
    }

    fn import_history(&self, file_path: &Path) -> Result<Vec<ExerciseHistoryEntry>> {
        read_json(file_path)
    }

    fn get_format_name(&self) -> &'static str {
        FORMAT
    }
}

/// A finished workout as logged, before its metrics are derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutInput {
    pub id: String,
    pub date: NaiveDate,
    pub duration_min: Decimal,
    #[serde(default)]
    pub blocks: Vec<WorkoutBlockRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<WorkoutInput>),
    One(WorkoutInput),
}

/// Load one workout or an array of workouts and derive their records
pub fn load_workout_records(
    file_path: &Path,
    calculator: &WorkoutMetricsCalculator,
) -> Result<Vec<WorkoutRecord>> {
    let inputs = match read_json::<OneOrMany>(file_path)? {
        OneOrMany::Many(inputs) => inputs,
        OneOrMany::One(input) => vec![input],
    };

    Ok(inputs
        .into_iter()
        .map(|w| calculator.summarize(w.id, w.date, w.duration_min, w.blocks))
        .collect())
}

fn read_json<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    if !file_path.exists() {
        return Err(ImportError::FileNotFound {
            path: file_path.to_path_buf(),
        }
        .into());
    }

    let content = fs::read_to_string(file_path)?;
    serde_json::from_str(&content).map_err(|e| {
        ImportError::InvalidDocument {
            format: FORMAT.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::Builder;

    fn write_json(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_history_array() {
        let file = write_json(
            r#"[
                {"exerciseId": "squat", "date": "2024-09-20", "sessionId": "s1",
                 "weight": 140, "rpe": 8, "volume": 700},
                {"exerciseId": "squat", "date": "2024-09-23", "sessionId": "s2",
                 "weight": "142.5", "volume": 712.5}
            ]"#,
        );

        let entries = JsonImporter::new().import_history(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].weight, dec!(142.5));
        assert_eq!(entries[1].rpe, None);
    }

    #[test]
    fn test_invalid_document() {
        let file = write_json("{\"not\": \"a list\"}");
        assert!(JsonImporter::new().import_history(file.path()).is_err());
    }

    #[test]
    fn test_single_workout_is_summarized() {
        let file = write_json(
            r#"{
                "id": "w1",
                "date": "2024-09-23",
                "durationMin": 50,
                "blocks": [{
                    "blockId": "b1",
                    "title": "Bench Press",
                    "type": "strength",
                    "prescribedSets": 2,
                    "prescribedReps": 5,
                    "sets": [
                        {"completed": true, "weight": 100, "rpe": 8, "restTimeMs": 120000},
                        {"completed": true, "weight": 100, "rpe": 8, "restTimeMs": 120000}
                    ]
                }]
            }"#,
        );

        let records =
            load_workout_records(file.path(), &WorkoutMetricsCalculator::new()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_volume, dec!(1000));
        assert_eq!(records[0].density_score, dec!(20));
    }

    #[test]
    fn test_workout_array() {
        let file = write_json(
            r#"[
                {"id": "w1", "date": "2024-09-20", "durationMin": 0},
                {"id": "w2", "date": "2024-09-23", "durationMin": 45, "blocks": []}
            ]"#,
        );

        let records =
            load_workout_records(file.path(), &WorkoutMetricsCalculator::new()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].intensity_score, dec!(0));
        assert_eq!(records[1].avg_rpe, None);
    }
}
