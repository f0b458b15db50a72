//! Offline training flow: load → split → fit → evaluate → persist.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;
use crate::error::Result;
use crate::ml::dataset::{Dataset, Label};
use crate::ml::metrics::ClassificationReport;
use crate::ml::models::{ModelMetadata, Prediction, SpamClassifier};
use crate::pipeline::{PIPELINE_NAME, SpamPipeline};

/// Messages classified after training as a quick sanity check.
pub const SANITY_MESSAGES: [&str; 2] = [
    "FREE entry! Win £1000 cash!",
    "Hey, are we still on for dinner?",
];

/// Outcome of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_size: usize,
    pub test_size: usize,
    pub vocabulary_size: usize,
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
    /// Held-out evaluation.
    pub evaluation: ClassificationReport,
    pub meets_target: bool,
    pub sample_predictions: Vec<Prediction>,
}

impl TrainingReport {
    pub fn accuracy(&self) -> f64 {
        self.evaluation.accuracy
    }
}

/// Evaluate a trained pipeline on a labeled dataset.
pub fn evaluate(pipeline: &SpamPipeline, dataset: &Dataset) -> Result<ClassificationReport> {
    let predicted = pipeline
        .predict_batch(&dataset.texts())?
        .into_iter()
        .map(|p| p.label)
        .collect::<Vec<_>>();
    ClassificationReport::from_predictions(&dataset.labels(), &predicted)
}

/// Split `dataset`, fit a pipeline on the training part and evaluate it on
/// the held-out part.
pub fn train(dataset: &Dataset, config: &TrainingConfig) -> Result<(SpamPipeline, TrainingReport)> {
    config.validate()?;

    let (train_set, test_set) = dataset.stratified_split(config.test_size, config.random_seed)?;
    log::info!(
        "Training on {} messages, evaluating on {}",
        train_set.len(),
        test_set.len()
    );

    let mut pipeline = SpamPipeline::new(config.vectorizer.clone(), config.classifier.clone())?;
    let summary = pipeline.fit(&train_set)?;

    let evaluation = evaluate(&pipeline, &test_set)?;
    let meets_target = evaluation.accuracy >= config.accuracy_target;
    log::info!("Held-out accuracy: {:.4}", evaluation.accuracy);
    if !meets_target {
        log::warn!(
            "Held-out accuracy {:.4} is below the target of {:.2}",
            evaluation.accuracy,
            config.accuracy_target
        );
    }

    let mut metadata = ModelMetadata::new(PIPELINE_NAME);
    metadata.training_examples = train_set.len();
    metadata.test_examples = test_set.len();
    metadata.spam_count = train_set.count(Label::Spam);
    metadata.ham_count = train_set.count(Label::Ham);
    metadata.vocabulary_size = pipeline.vocabulary_size();
    metadata.accuracy = Some(evaluation.accuracy);
    metadata.iterations = summary.iterations;
    metadata.converged = summary.converged;
    metadata.hyperparameters = [
        ("c", config.classifier.c),
        ("tol", config.classifier.tol),
        ("max_iter", config.classifier.max_iter as f64),
        ("min_df", config.vectorizer.min_df as f64),
        ("max_df", config.vectorizer.max_df),
        ("test_size", config.test_size),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    if let Some(max_features) = config.vectorizer.max_features {
        metadata
            .hyperparameters
            .insert("max_features".to_string(), max_features as f64);
    }
    pipeline.set_metadata(metadata);

    let sample_predictions = SANITY_MESSAGES
        .iter()
        .map(|m| pipeline.predict(m))
        .collect::<Result<Vec<_>>>()?;
    for p in &sample_predictions {
        log::info!(
            "Sample: {:?} -> {} (spam probability {:.3})",
            p.message,
            p.label,
            p.spam_probability
        );
    }

    let report = TrainingReport {
        train_size: train_set.len(),
        test_size: test_set.len(),
        vocabulary_size: pipeline.vocabulary_size(),
        iterations: summary.iterations,
        converged: summary.converged,
        final_loss: summary.final_loss,
        evaluation,
        meets_target,
        sample_predictions,
    };
    Ok((pipeline, report))
}

/// Load a labeled CSV and train on it.
pub fn train_from_csv<P: AsRef<Path>>(
    csv_path: P,
    config: &TrainingConfig,
) -> Result<(SpamPipeline, TrainingReport)> {
    let dataset = Dataset::load_csv(csv_path, config.has_headers)?;
    train(&dataset, config)
}

/// Train from a CSV and persist the pipeline. Nothing is written unless
/// training succeeds.
pub fn train_and_save<P: AsRef<Path>, Q: AsRef<Path>>(
    csv_path: P,
    model_path: Q,
    config: &TrainingConfig,
) -> Result<TrainingReport> {
    let (pipeline, report) = train_from_csv(csv_path, config)?;
    pipeline.save(model_path)?;
    Ok(report)
}
