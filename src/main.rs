use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

use liftrs::catalog::{ExerciseCatalog, InMemoryCatalog};
use liftrs::history::{HistoryAggregator, WorkoutScore};
use liftrs::import::{load_workout_records, ImportManager};
use liftrs::labels;
use liftrs::logging::init_logging;
use liftrs::metrics::WorkoutMetricsCalculator;
use liftrs::recommender::WeightRecommender;
use liftrs::{AppConfig, ExerciseHistoryEntry};

/// LiftRS - Strength Training Analytics CLI
///
/// Turns logged sets into weight recommendations, per-workout metrics and
/// chart-ready trend series.
#[derive(Parser)]
#[command(name = "liftrs")]
#[command(author = "LiftRS Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Strength Training Analytics CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Exercise catalog (TOML `[exercises]` table); ids name themselves without one
    #[arg(long, value_name = "FILE", global = true)]
    catalog: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the exercises present in a training log
    Exercises {
        /// History file (CSV or JSON)
        #[arg(short = 'H', long, value_name = "FILE")]
        history: PathBuf,
    },

    /// Show the logged sets of one exercise, most recent first
    History {
        #[arg(short = 'H', long, value_name = "FILE")]
        history: PathBuf,

        /// Exercise display name
        #[arg(short, long)]
        exercise: String,

        /// Number of sets to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Weight, RPE and volume trend series for one exercise
    Trends {
        #[arg(short = 'H', long, value_name = "FILE")]
        history: PathBuf,

        #[arg(short, long)]
        exercise: String,

        /// Label dates relative to this day (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Recommend the next working weight for one exercise
    Recommend {
        #[arg(short = 'H', long, value_name = "FILE")]
        history: PathBuf,

        #[arg(short, long)]
        exercise: String,

        /// Target RPE for the next session
        #[arg(short, long)]
        target_rpe: Option<Decimal>,

        /// Recovery score (0-100)
        #[arg(short, long)]
        recovery: Option<Decimal>,
    },

    /// Summarize finished workouts and chart one of their scores
    Workout {
        /// Workout file (JSON object or array)
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// Score to chart (volume, density, intensity)
        #[arg(short, long, default_value = "density")]
        score: WorkoutScore,

        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Session")]
    session: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "RPE")]
    rpe: String,
    #[tabled(rename = "Volume")]
    volume: String,
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "RPE")]
    rpe: String,
    #[tabled(rename = "Volume")]
    volume: String,
}

#[derive(Tabled)]
struct WorkoutRow {
    #[tabled(rename = "Workout")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Avg RPE")]
    avg_rpe: String,
    #[tabled(rename = "Avg Rest (s)")]
    avg_rest: String,
    #[tabled(rename = "Density")]
    density: String,
    #[tabled(rename = "Intensity")]
    intensity: String,
}

#[derive(Serialize)]
struct TrendSeries {
    weight: Vec<liftrs::WeightTrendPoint>,
    rpe: Vec<liftrs::TrendPoint>,
    volume: Vec<liftrs::TrendPoint>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config)?;

    let catalog_path = cli.catalog.clone().or_else(|| config.catalog_path.clone());
    let aggregator = HistoryAggregator::with_config(config.trends.clone());

    match cli.command {
        Commands::Exercises { history } => {
            let entries = load_history(&history)?;
            let catalog = load_catalog(catalog_path.as_deref(), &entries)?;
            let names = aggregator.list_exercises(&entries, &catalog);

            if cli.json {
                print_json(&names)?;
            } else if names.is_empty() {
                println!("{}", "No exercises logged yet".yellow());
            } else {
                println!("{}", "Logged exercises".green().bold());
                for name in names {
                    println!("  {}", name);
                }
            }
        }

        Commands::History {
            history,
            exercise,
            limit,
        } => {
            let entries = load_history(&history)?;
            let catalog = load_catalog(catalog_path.as_deref(), &entries)?;
            let sets = aggregator.history_for_exercise(&entries, &exercise, &catalog);

            if cli.json {
                print_json(&sets)?;
            } else if sets.is_empty() {
                println!("{}", format!("No history for '{}'", exercise).yellow());
            } else {
                println!("{}", format!("{} history", exercise).blue().bold());
                let rows: Vec<HistoryRow> = sets
                    .iter()
                    .take(limit)
                    .map(|e| HistoryRow {
                        date: e.date.to_string(),
                        session: e.session_id.clone(),
                        weight: e.weight.to_string(),
                        rpe: optional(e.rpe),
                        volume: e.volume.to_string(),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
        }

        Commands::Trends {
            history,
            exercise,
            today,
        } => {
            let entries = load_history(&history)?;
            let catalog = load_catalog(catalog_path.as_deref(), &entries)?;
            let sets = aggregator.history_for_exercise(&entries, &exercise, &catalog);
            let today = today.unwrap_or_else(labels::today);

            let series = TrendSeries {
                weight: aggregator.weight_trend(&sets, today),
                rpe: aggregator.rpe_trend(&sets, today),
                volume: aggregator.volume_trend(&sets, today),
            };

            if cli.json {
                print_json(&series)?;
            } else if series.weight.is_empty() {
                println!("{}", format!("No history for '{}'", exercise).yellow());
            } else {
                println!("{}", format!("{} trends", exercise).cyan().bold());
                let rows: Vec<TrendRow> = aggregator
                    .recent_sessions(&sets)
                    .iter()
                    .map(|s| TrendRow {
                        date: labels::date_label(s.date, today),
                        weight: liftrs::rounding::round_tenth(s.avg_weight).to_string(),
                        rpe: optional(s.avg_rpe.map(liftrs::rounding::round_tenth)),
                        volume: liftrs::rounding::round_whole(s.total_volume).to_string(),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
        }

        Commands::Recommend {
            history,
            exercise,
            target_rpe,
            recovery,
        } => {
            let entries = load_history(&history)?;
            let catalog = load_catalog(catalog_path.as_deref(), &entries)?;
            let sets = aggregator.history_for_exercise(&entries, &exercise, &catalog);
            let exercise_id = catalog
                .resolve_id_by_name(&exercise)
                .unwrap_or_else(|| exercise.clone());

            let recommender = WeightRecommender::with_config(config.recommender.clone());
            let recommendation = recommender.explain(&exercise_id, target_rpe, recovery, &sets);

            if cli.json {
                print_json(&recommendation)?;
            } else {
                match recommendation {
                    Some(rec) => {
                        println!("{}", format!("{} next session", exercise).green().bold());
                        println!("  Last logged: {}", rec.base_weight);
                        for adjustment in &rec.adjustments {
                            println!("  {}", adjustment.description().dimmed());
                        }
                        println!("  Recommended: {}", rec.weight.to_string().bold());
                    }
                    None => {
                        println!(
                            "{}",
                            format!(
                                "No history for '{}' yet. Log a session to get a recommendation.",
                                exercise
                            )
                            .yellow()
                        );
                    }
                }
            }
        }

        Commands::Workout { file, score, today } => {
            let calculator = WorkoutMetricsCalculator::with_config(config.metrics.clone());
            let records = load_workout_records(&file, &calculator)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let today = today.unwrap_or_else(labels::today);
            let trend = aggregator.workout_score_trend(&records, score, today);

            if cli.json {
                print_json(&serde_json::json!({ "workouts": records, "trend": trend }))?;
            } else {
                println!("{}", "Workout summary".magenta().bold());
                let rows: Vec<WorkoutRow> = records
                    .iter()
                    .map(|r| WorkoutRow {
                        id: r.id.clone(),
                        date: r.date.to_string(),
                        volume: r.total_volume.to_string(),
                        avg_rpe: optional(r.avg_rpe),
                        avg_rest: optional(r.avg_rest_sec),
                        density: r.density_score.to_string(),
                        intensity: r.intensity_score.to_string(),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
        }
    }

    Ok(())
}

fn load_history(path: &Path) -> Result<Vec<ExerciseHistoryEntry>> {
    ImportManager::new()
        .import_history(path)
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .with_context(|| format!("Failed to load history from {}", path.display()))
}

fn load_catalog(path: Option<&Path>, entries: &[ExerciseHistoryEntry]) -> Result<InMemoryCatalog> {
    match path {
        Some(path) => InMemoryCatalog::load_from_file(path)
            .map_err(|e| anyhow::anyhow!(e.user_message()))
            .with_context(|| format!("Failed to load catalog from {}", path.display())),
        None => Ok(InMemoryCatalog::from_history(entries)),
    }
}

fn optional(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
