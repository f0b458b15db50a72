//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, SpamDetectorArgs};
use crate::error::Result;
use crate::ml::dataset::Label;
use crate::ml::metrics::ClassificationReport;
use crate::ml::models::{ModelMetadata, Prediction};
use crate::pipeline::TermWeight;
use crate::training::TrainingReport;

/// Width of the probability bar in human output.
const BAR_WIDTH: usize = 30;

/// Results that know how to print themselves for a terminal.
pub trait HumanOutput {
    fn print_human(&self, args: &SpamDetectorArgs);
}

/// Result of `predict`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub message: String,
    pub label: Label,
    pub spam_probability: f64,
    pub confidence: f64,
}

impl From<Prediction> for PredictionOutput {
    fn from(prediction: Prediction) -> Self {
        Self {
            confidence: prediction.confidence(),
            message: prediction.message,
            label: prediction.label,
            spam_probability: prediction.spam_probability,
        }
    }
}

/// Result of `train`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingOutput {
    pub model_path: String,
    pub report: TrainingReport,
}

/// Result of `evaluate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationOutput {
    pub model_path: String,
    pub data_path: String,
    pub report: ClassificationReport,
}

/// Result of `inspect`.
#[derive(Debug, Serialize, Deserialize)]
pub struct InspectOutput {
    pub model_path: String,
    pub vocabulary_size: usize,
    pub intercept: f64,
    pub metadata: Option<ModelMetadata>,
    pub spam_terms: Vec<TermWeight>,
    pub ham_terms: Vec<TermWeight>,
}

/// Output a result in the selected format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &SpamDetectorArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            result.print_human(args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

fn output_json<T: Serialize>(result: &T, args: &SpamDetectorArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

/// Text bar for a value in [0, 1].
pub fn probability_bar(probability: f64, width: usize) -> String {
    let filled = (probability.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn print_terms(title: &str, terms: &[TermWeight]) {
    println!("{title}");
    if terms.is_empty() {
        println!("  (none)");
    }
    for t in terms {
        println!("  {:>+8.4}  {}", t.weight, t.term);
    }
}

impl HumanOutput for PredictionOutput {
    fn print_human(&self, args: &SpamDetectorArgs) {
        let verdict = match self.label {
            Label::Spam => "SPAM",
            Label::Ham => "HAM (not spam)",
        };
        println!("Prediction:  {verdict}");
        println!("Confidence:  {:.1}%", self.confidence * 100.0);
        println!(
            "Spam score:  {} {:.1}%",
            probability_bar(self.spam_probability, BAR_WIDTH),
            self.spam_probability * 100.0
        );
        if args.verbosity() > 1 {
            println!("Message:     {}", self.message);
        }
    }
}

impl HumanOutput for TrainingOutput {
    fn print_human(&self, _args: &SpamDetectorArgs) {
        let r = &self.report;
        println!("Training complete");
        println!("═════════════════");
        println!("Train / test:     {} / {}", r.train_size, r.test_size);
        println!("Vocabulary size:  {}", r.vocabulary_size);
        println!(
            "Optimizer:        {} iterations ({})",
            r.iterations,
            if r.converged { "converged" } else { "not converged" }
        );
        println!();
        println!("{}", r.evaluation);
        if !r.meets_target {
            println!();
            println!("Warning: held-out accuracy is below the configured target");
        }
        println!();
        for p in &r.sample_predictions {
            println!(
                "  {:<5} {:>6.1}%  {}",
                p.label,
                p.spam_probability * 100.0,
                p.message
            );
        }
        println!();
        println!("Model saved to {}", self.model_path);
    }
}

impl HumanOutput for EvaluationOutput {
    fn print_human(&self, _args: &SpamDetectorArgs) {
        println!("Evaluation of {} on {}", self.model_path, self.data_path);
        println!("{}", self.report);
    }
}

impl HumanOutput for InspectOutput {
    fn print_human(&self, _args: &SpamDetectorArgs) {
        println!("Model:            {}", self.model_path);
        println!("Vocabulary size:  {}", self.vocabulary_size);
        println!("Intercept:        {:+.4}", self.intercept);
        if let Some(m) = &self.metadata {
            println!("Name:             {} (v{})", m.name, m.version);
            println!("Trained at:       {}", m.trained_at.to_rfc3339());
            println!(
                "Training data:    {} messages ({} spam, {} ham), {} held out",
                m.training_examples, m.spam_count, m.ham_count, m.test_examples
            );
            if let Some(accuracy) = m.accuracy {
                println!("Held-out accuracy: {accuracy:.4}");
            }
            for (name, value) in &m.hyperparameters {
                println!("  {name} = {value}");
            }
        }
        println!();
        print_terms("Most spam-indicative terms:", &self.spam_terms);
        println!();
        print_terms("Most ham-indicative terms:", &self.ham_terms);
    }
}
