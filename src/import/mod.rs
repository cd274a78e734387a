use std::path::Path;

use crate::error::{ImportError, Result};
use crate::models::ExerciseHistoryEntry;

pub mod csv;
pub mod json;

pub use json::{load_workout_records, WorkoutInput};

/// Trait for reading logged sets from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Read every history entry in the file
    fn import_history(&self, file_path: &Path) -> Result<Vec<ExerciseHistoryEntry>>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Picks an importer by file extension
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat>> = vec![
            Box::new(csv::CsvImporter::new()),
            Box::new(json::JsonImporter::new()),
        ];

        Self { importers }
    }

    /// Import a history file, auto-detecting the format
    pub fn import_history(&self, file_path: &Path) -> Result<Vec<ExerciseHistoryEntry>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        let importer = self
            .importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .ok_or_else(|| ImportError::UnsupportedFormat {
                format: extension_of(file_path).unwrap_or_else(|| "unknown".to_string()),
            })?;

        tracing::info!(
            file = %file_path.display(),
            format = importer.get_format_name(),
            "Importing training history"
        );

        let entries = importer.import_history(file_path)?;
        tracing::debug!(entries = entries.len(), "History import finished");
        Ok(entries)
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased file extension
pub(crate) fn extension_of(file_path: &Path) -> Option<String> {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LiftRsError;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_dispatch_by_extension() {
        let mut file = Builder::new().suffix(".CSV").tempfile().unwrap();
        writeln!(file, "exercise_id,date,session_id,weight").unwrap();
        writeln!(file, "squat,2024-09-23,s1,100").unwrap();

        let entries = ImportManager::new().import_history(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".fit").tempfile().unwrap();
        let result = ImportManager::new().import_history(file.path());
        assert!(matches!(
            result,
            Err(LiftRsError::Import(ImportError::UnsupportedFormat { .. }))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ImportManager::new().import_history(Path::new("/nonexistent/log.csv"));
        assert!(matches!(
            result,
            Err(LiftRsError::Import(ImportError::FileNotFound { .. }))
        ));
    }
}
