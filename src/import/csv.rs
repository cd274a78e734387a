use chrono::{DateTime, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ImportError, Result};
use crate::import::{extension_of, ImportFormat};
use crate::models::ExerciseHistoryEntry;

const FORMAT: &str = "CSV";

/// CSV importer with flexible column mapping
pub struct CsvImporter {
    column_mapping: HashMap<String, String>,
}

/// Column positions for one file
struct Columns {
    exercise_id: usize,
    date: usize,
    session_id: usize,
    weight: usize,
    rpe: Option<usize>,
    volume: Option<usize>,
    reps: Option<usize>,
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        // Common column name variations
        Self::add_mapping(
            &mut column_mapping,
            "exercise_id",
            &["exercise_id", "exerciseid", "exercise", "lift", "movement"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "date",
            &["date", "day", "performed_on", "logged_at", "timestamp"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "session_id",
            &["session_id", "sessionid", "session", "workout_id", "workout"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "weight",
            &["weight", "load", "weight_kg", "weight_lb", "kg", "lbs"],
        );
        Self::add_mapping(&mut column_mapping, "rpe", &["rpe", "effort", "exertion"]);
        Self::add_mapping(&mut column_mapping, "volume", &["volume", "tonnage"]);
        Self::add_mapping(&mut column_mapping, "reps", &["reps", "repetitions"]);

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    fn normalize_column_name(&self, name: &str) -> String {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");

        self.column_mapping
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    fn resolve_columns(&self, headers: &StringRecord) -> Result<Columns> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            positions
                .entry(self.normalize_column_name(header))
                .or_insert(index);
        }

        let required = |column: &str| -> Result<usize> {
            positions.get(column).copied().ok_or_else(|| {
                ImportError::MissingColumn {
                    column: column.to_string(),
                }
                .into()
            })
        };

        Ok(Columns {
            exercise_id: required("exercise_id")?,
            date: required("date")?,
            session_id: required("session_id")?,
            weight: required("weight")?,
            rpe: positions.get("rpe").copied(),
            volume: positions.get("volume").copied(),
            reps: positions.get("reps").copied(),
        })
    }

    fn parse_date(value: &str) -> Option<NaiveDate> {
        let formats = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

        for format in &formats {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Some(date);
            }
        }

        // Full timestamps keep only their calendar day
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.date_naive())
    }

    fn parse_decimal(value: &str) -> std::result::Result<Option<Decimal>, String> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }

        Decimal::from_str(value)
            .map(Some)
            .map_err(|e| format!("'{}' is not a number: {}", value, e))
    }

    fn parse_record(
        &self,
        record: &StringRecord,
        columns: &Columns,
    ) -> std::result::Result<ExerciseHistoryEntry, String> {
        let field = |index: usize| record.get(index).map(str::trim).unwrap_or("");
        let optional = |index: Option<usize>| -> std::result::Result<Option<Decimal>, String> {
            match index {
                Some(i) => Self::parse_decimal(field(i)),
                None => Ok(None),
            }
        };

        let exercise_id = field(columns.exercise_id);
        if exercise_id.is_empty() {
            return Err("empty exercise id".to_string());
        }
        let session_id = field(columns.session_id);
        if session_id.is_empty() {
            return Err("empty session id".to_string());
        }

        let date_str = field(columns.date);
        let date = Self::parse_date(date_str)
            .ok_or_else(|| format!("unable to parse date '{}'", date_str))?;

        let weight = Self::parse_decimal(field(columns.weight))?.unwrap_or(Decimal::ZERO);
        if weight < Decimal::ZERO {
            return Err(format!("negative weight {}", weight));
        }

        let rpe = optional(columns.rpe)?;

        // Volume column wins; otherwise derive it from reps when present
        let volume = match optional(columns.volume)? {
            Some(volume) => volume,
            None => optional(columns.reps)?
                .map(|reps| reps * weight)
                .unwrap_or(Decimal::ZERO),
        };

        let mut entry = ExerciseHistoryEntry::new(exercise_id, date, session_id, weight)
            .with_volume(volume);
        entry.rpe = rpe;
        Ok(entry)
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        extension_of(file_path).as_deref() == Some("csv")
    }

    fn import_history(&self, file_path: &Path) -> Result<Vec<ExerciseHistoryEntry>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(file_path)
            .map_err(|e| ImportError::InvalidDocument {
                format: FORMAT.to_string(),
                reason: e.to_string(),
            })?;

        let headers = reader
            .headers()
            .map_err(|e| ImportError::InvalidDocument {
                format: FORMAT.to_string(),
                reason: e.to_string(),
            })?
            .clone();
        let columns = self.resolve_columns(&headers)?;

        let mut entries = Vec::new();
        for (index, result) in reader.records().enumerate() {
            // Record numbers are 1-based and skip the header row
            let record_number = index + 1;
            let record = result.map_err(|e| ImportError::ParseError {
                format: FORMAT.to_string(),
                record: record_number,
                reason: e.to_string(),
            })?;

            let entry = self
                .parse_record(&record, &columns)
                .map_err(|reason| ImportError::ParseError {
                    format: FORMAT.to_string(),
                    record: record_number,
                    reason,
                })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    fn get_format_name(&self) -> &'static str {
        FORMAT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LiftRsError;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::Builder;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_column_aliases() {
        let file = write_csv(
            "Exercise,Day,Session,Load,Effort,Tonnage\n\
             squat,2024-09-23,s1,140,8.5,700\n\
             squat,2024-09-23,s1,140,,700\n",
        );

        let entries = CsvImporter::new().import_history(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].exercise_id, "squat");
        assert_eq!(entries[0].weight, dec!(140));
        assert_eq!(entries[0].rpe, Some(dec!(8.5)));
        assert_eq!(entries[0].volume, dec!(700));
        assert_eq!(entries[1].rpe, None);
    }

    #[test]
    fn test_volume_derived_from_reps() {
        let file = write_csv(
            "exercise_id,date,session_id,weight,reps\n\
             bench_press,2024-09-21T18:30:00Z,s7,80,5\n",
        );

        let entries = CsvImporter::new().import_history(file.path()).unwrap();
        assert_eq!(entries[0].volume, dec!(400));
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2024, 9, 21).unwrap());
    }

    #[test]
    fn test_missing_required_column() {
        let file = write_csv("exercise_id,date,weight\nsquat,2024-09-23,100\n");

        let result = CsvImporter::new().import_history(file.path());
        match result {
            Err(LiftRsError::Import(ImportError::MissingColumn { column })) => {
                assert_eq!(column, "session_id")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_bad_value_reports_record_number() {
        let file = write_csv(
            "exercise_id,date,session_id,weight\n\
             squat,2024-09-23,s1,100\n\
             squat,not-a-date,s2,100\n",
        );

        let result = CsvImporter::new().import_history(file.path());
        match result {
            Err(LiftRsError::Import(ImportError::ParseError { record, .. })) => {
                assert_eq!(record, 2)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_negative_weight_rejected() {
        let file = write_csv("exercise_id,date,session_id,weight\nsquat,2024-09-23,s1,-5\n");
        assert!(CsvImporter::new().import_history(file.path()).is_err());
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let file = write_csv("exercise_id,date,session_id,weight\n");
        let entries = CsvImporter::new().import_history(file.path()).unwrap();
        assert!(entries.is_empty());
    }
}
