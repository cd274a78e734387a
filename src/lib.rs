// Library interface for LiftRS modules
// The binary and the integration tests both go through this crate root

pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod import;
pub mod labels;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod recommender;
pub mod rounding;

// Re-export commonly used types for convenience
pub use catalog::{ExerciseCatalog, InMemoryCatalog};
pub use config::AppConfig;
pub use error::{LiftRsError, Result};
pub use history::{HistoryAggregator, TrendConfig};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use metrics::{BlockMetrics, MetricsConfig, WorkoutMetricsCalculator, WorkoutTotals};
pub use models::*;
pub use recommender::{Adjustment, Recommendation, RecommenderConfig, WeightRecommender};
