//! Exercise catalog lookups
//!
//! The real catalog belongs to the host application. The engine only needs
//! name <-> id resolution, so it talks to the catalog through
//! [`ExerciseCatalog`]. [`InMemoryCatalog`] backs the CLI and the tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ImportError, Result};
use crate::models::ExerciseHistoryEntry;

/// Name/id resolution provided by the exercise metadata catalog
pub trait ExerciseCatalog {
    /// Resolve a display name to an exercise id, `None` when unknown
    fn resolve_id_by_name(&self, name: &str) -> Option<String>;

    /// Resolve an exercise id to its display name, falling back to the id
    fn resolve_name_by_id(&self, id: &str) -> String;
}

/// Catalog held in memory as an id -> display name map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryCatalog {
    exercises: BTreeMap<String, String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(id, name)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            exercises: pairs
                .into_iter()
                .map(|(id, name)| (id.into(), name.into()))
                .collect(),
        }
    }

    /// Catalog where every exercise id seen in `entries` names itself
    pub fn from_history(entries: &[ExerciseHistoryEntry]) -> Self {
        Self::from_pairs(
            entries
                .iter()
                .map(|e| (e.exercise_id.clone(), e.exercise_id.clone())),
        )
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.exercises.insert(id.into(), name.into());
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Load from a TOML file with an `[exercises]` table of `id = "Name"`
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = fs::read_to_string(path)?;
        let catalog: InMemoryCatalog = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            path = %path.display(),
            exercises = catalog.len(),
            "Loaded exercise catalog"
        );

        Ok(catalog)
    }
}

impl ExerciseCatalog for InMemoryCatalog {
    fn resolve_id_by_name(&self, name: &str) -> Option<String> {
        self.exercises
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| id.clone())
    }

    fn resolve_name_by_id(&self, id: &str) -> String {
        self.exercises
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}
