//! Error hierarchy for LiftRS
//!
//! The analytics engine itself never fails: missing data is reported as `None`
//! or zero. These types cover the layers around it (configuration, catalog
//! and history file loading, the CLI).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all LiftRS operations
#[derive(Debug, Error)]
pub enum LiftRsError {
    /// History or workout import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while reading history, workout or catalog files
#[derive(Debug, Error)]
pub enum ImportError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No importer handles this file
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Required column absent from a tabular file
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// Format-specific parsing error
    #[error("Parse error in {format} at record {record}: {reason}")]
    ParseError {
        format: String,
        record: usize,
        reason: String,
    },

    /// Whole-document deserialization failure
    #[error("Invalid {format} document: {reason}")]
    InvalidDocument { format: String, reason: String },
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not parse the TOML document
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Could not serialize the configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// A value is outside its permitted range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type alias for LiftRS operations
pub type Result<T> = std::result::Result<T, LiftRsError>;

impl LiftRsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiftRsError::Import(ImportError::FileNotFound { .. }) => ErrorSeverity::Warning,
            LiftRsError::Import(ImportError::ParseError { .. }) => ErrorSeverity::Warning,
            LiftRsError::Validation(_) => ErrorSeverity::Warning,
            LiftRsError::Config(_) => ErrorSeverity::Error,
            LiftRsError::Internal(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LiftRsError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find training log: {}", path.display())
            }
            LiftRsError::Import(ImportError::MissingColumn { column }) => {
                format!(
                    "The training log has no '{}' column. Check the CSV header row.",
                    column
                )
            }
            LiftRsError::Config(ConfigError::InvalidValue { field, reason }) => {
                format!("Configuration value '{}' is not usable: {}", field, reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
