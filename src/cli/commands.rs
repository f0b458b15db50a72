//! Command implementations for the spam detector CLI.

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::TrainingConfig;
use crate::error::{Result, SpamError};
use crate::ml::cache;
use crate::ml::dataset::Dataset;
use crate::ml::models::SpamClassifier;
use crate::pipeline::SpamPipeline;
use crate::training;

/// Execute a CLI command.
pub fn execute_command(args: SpamDetectorArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train_model(train_args, &args),
        Command::Predict(predict_args) => predict_message(predict_args, &args),
        Command::Evaluate(eval_args) => evaluate_model(eval_args, &args),
        Command::Inspect(inspect_args) => inspect_model(inspect_args, &args),
    }
}

/// Train a pipeline and write it to disk.
fn train_model(args: &TrainArgs, cli_args: &SpamDetectorArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading training configuration from {}", path.display());
            TrainingConfig::from_file(path)?
        }
        None => TrainingConfig::default(),
    };
    args.apply_to(&mut config);

    let report = training::train_and_save(&args.data, &args.output, &config)?;

    output_result(
        "Training finished",
        &TrainingOutput {
            model_path: args.output.display().to_string(),
            report,
        },
        cli_args,
    )
}

/// Classify one message with the cached pipeline.
fn predict_message(args: &PredictArgs, cli_args: &SpamDetectorArgs) -> Result<()> {
    let message = args.message.trim();
    if message.is_empty() {
        return Err(SpamError::invalid_argument(
            "message is empty; enter some text to classify",
        ));
    }

    let pipeline = cache::shared(&args.model).get()?;
    let prediction = pipeline.predict(message)?;

    output_result(
        "Prediction",
        &PredictionOutput::from(prediction),
        cli_args,
    )
}

/// Score a saved pipeline against a labeled file.
fn evaluate_model(args: &EvaluateArgs, cli_args: &SpamDetectorArgs) -> Result<()> {
    let pipeline = SpamPipeline::load(&args.model)?;
    let dataset = Dataset::load_csv(&args.data, args.has_headers)?;
    let report = training::evaluate(&pipeline, &dataset)?;

    output_result(
        "Evaluation finished",
        &EvaluationOutput {
            model_path: args.model.display().to_string(),
            data_path: args.data.display().to_string(),
            report,
        },
        cli_args,
    )
}

/// Describe a saved pipeline.
fn inspect_model(args: &InspectArgs, cli_args: &SpamDetectorArgs) -> Result<()> {
    let pipeline = SpamPipeline::load(&args.model)?;
    let (spam_terms, ham_terms) = pipeline.top_terms(args.top)?;

    output_result(
        "Model information",
        &InspectOutput {
            model_path: args.model.display().to_string(),
            vocabulary_size: pipeline.vocabulary_size(),
            intercept: pipeline.classifier().intercept(),
            metadata: pipeline.metadata().cloned(),
            spam_terms,
            ham_terms,
        },
        cli_args,
    )
}
