//! Command line argument parsing for the spam detector CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_MODEL_PATH, TrainingConfig};

/// spam-detector - SMS spam classification with TF-IDF and logistic regression
#[derive(Parser, Debug, Clone)]
#[command(name = "spam-detector")]
#[command(about = "Train and query an SMS spam classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SpamDetectorArgs {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SpamDetectorArgs {
    /// Effective verbosity: 0 quiet, 1 normal, 2 verbose, 3+ debug.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fit a pipeline on a labeled CSV and save it
    Train(TrainArgs),

    /// Classify a single message
    Predict(PredictArgs),

    /// Measure a saved pipeline on a labeled CSV
    Evaluate(EvaluateArgs),

    /// Show metadata and the most indicative terms of a saved pipeline
    Inspect(InspectArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Two-column CSV file (label, text)
    #[arg(value_name = "CSV")]
    pub data: PathBuf,

    /// Where to write the trained pipeline
    #[arg(short, long, value_name = "MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub output: PathBuf,

    /// Training configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// The CSV starts with a header row
    #[arg(long)]
    pub has_headers: bool,

    /// Fraction of each class held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Seed for the train/test split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Inverse regularization strength
    #[arg(long = "c", value_name = "C")]
    pub c: Option<f64>,

    /// Maximum vocabulary size
    #[arg(long)]
    pub max_features: Option<usize>,
}

impl TrainArgs {
    /// Overlay command line values onto `config`.
    pub fn apply_to(&self, config: &mut TrainingConfig) {
        if self.has_headers {
            config.has_headers = true;
        }
        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }
        if let Some(seed) = self.seed {
            config.random_seed = seed;
        }
        if let Some(c) = self.c {
            config.classifier.c = c;
        }
        if let Some(max_features) = self.max_features {
            config.vectorizer.max_features = Some(max_features);
        }
    }
}

/// Arguments for classifying a message
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Message text to classify
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Trained pipeline file
    #[arg(short, long, value_name = "MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,
}

/// Arguments for evaluating a saved pipeline
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Two-column CSV file (label, text)
    #[arg(value_name = "CSV")]
    pub data: PathBuf,

    /// Trained pipeline file
    #[arg(short, long, value_name = "MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// The CSV starts with a header row
    #[arg(long)]
    pub has_headers: bool,
}

/// Arguments for inspecting a saved pipeline
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Trained pipeline file
    #[arg(short, long, value_name = "MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Number of terms to list per class
    #[arg(short, long, default_value = "10")]
    pub top: usize,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
