//! The spam classification pipeline: TF-IDF features feeding a logistic
//! regression, fitted together once and persisted as a single artifact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamError};
use crate::ml::dataset::{Dataset, Label};
use crate::ml::logistic::{FitSummary, LogisticRegression, LogisticRegressionConfig};
use crate::ml::models::{ModelMetadata, Prediction, SpamClassifier};
use crate::ml::tfidf::{TfIdfConfig, TfIdfVectorizer};

/// Identifier recorded in the artifact metadata.
pub const PIPELINE_NAME: &str = "tfidf-logistic-regression";

/// A vocabulary term together with its learned coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermWeight {
    pub term: String,
    pub weight: f64,
}

/// Feature extractor and classifier composed into one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamPipeline {
    vectorizer: TfIdfVectorizer,
    classifier: LogisticRegression,
    metadata: Option<ModelMetadata>,
}

impl SpamPipeline {
    /// Create an untrained pipeline.
    pub fn new(vectorizer: TfIdfConfig, classifier: LogisticRegressionConfig) -> Result<Self> {
        Ok(Self {
            vectorizer: TfIdfVectorizer::new(vectorizer)?,
            classifier: LogisticRegression::new(classifier)?,
            metadata: None,
        })
    }

    /// Untrained pipeline with the default hyperparameters.
    pub fn with_defaults() -> Result<Self> {
        Self::new(TfIdfConfig::default(), LogisticRegressionConfig::default())
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    pub(crate) fn set_metadata(&mut self, metadata: ModelMetadata) {
        self.metadata = Some(metadata);
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    /// Fit the vectorizer and the classifier on a labeled dataset.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<FitSummary> {
        self.fit_texts(&dataset.texts(), &dataset.labels())
    }

    /// Fit on parallel slices of texts and labels.
    pub fn fit_texts(&mut self, texts: &[String], labels: &[Label]) -> Result<FitSummary> {
        if self.is_trained() {
            return Err(SpamError::already_trained(
                "pipeline has already been fitted; create a new one to retrain",
            ));
        }
        if texts.len() != labels.len() {
            return Err(SpamError::invalid_argument(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }

        let features = self.vectorizer.fit_transform(texts)?;
        log::info!(
            "Vectorized {} messages into {} features",
            features.len(),
            self.vectorizer.vocabulary_size()
        );

        let summary = self.classifier.fit(&features, labels)?;
        log::info!(
            "Classifier fitted in {} iterations (loss {:.6}, converged: {})",
            summary.iterations,
            summary.final_loss,
            summary.converged
        );
        Ok(summary)
    }

    /// Probability that `message` is spam.
    pub fn spam_probability(&self, message: &str) -> Result<f64> {
        self.ensure_trained()?;
        let features = self.vectorizer.transform(message)?;
        self.classifier.predict_proba(&features)
    }

    /// The `n` terms with the largest positive (spam) and negative (ham)
    /// coefficients, strongest first.
    pub fn top_terms(&self, n: usize) -> Result<(Vec<TermWeight>, Vec<TermWeight>)> {
        self.ensure_trained()?;
        let vocabulary = self.vectorizer.vocabulary();
        let mut weighted: Vec<TermWeight> = self
            .classifier
            .weights()
            .iter()
            .enumerate()
            .filter_map(|(i, &weight)| {
                vocabulary.term(i).map(|term| TermWeight {
                    term: term.to_string(),
                    weight,
                })
            })
            .collect();

        weighted.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.term.cmp(&b.term)));
        let spam: Vec<TermWeight> = weighted
            .iter()
            .take(n)
            .filter(|t| t.weight > 0.0)
            .cloned()
            .collect();
        let ham: Vec<TermWeight> = weighted
            .iter()
            .rev()
            .take(n)
            .filter(|t| t.weight < 0.0)
            .cloned()
            .collect();
        Ok((spam, ham))
    }

    fn ensure_trained(&self) -> Result<()> {
        if self.is_trained() {
            Ok(())
        } else {
            Err(SpamError::not_trained("pipeline has not been fitted"))
        }
    }

    /// Persist the pipeline as a single bincode artifact.
    ///
    /// The artifact is written to a temporary sibling file first and renamed
    /// into place, so an existing artifact is never left half-written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.ensure_trained()?;
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = temporary_sibling(path);
        let result = (|| -> Result<()> {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            bincode::serialize_into(&mut writer, self)?;
            writer.flush()?;
            Ok(())
        })();
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, path)?;

        log::info!("Saved pipeline to {}", path.display());
        Ok(())
    }

    /// Load a pipeline written by [`SpamPipeline::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SpamError::artifact_not_found(path));
        }

        let reader = BufReader::new(File::open(path)?);
        let pipeline: SpamPipeline = bincode::deserialize_from(reader).map_err(|e| {
            SpamError::serialization(format!(
                "failed to decode pipeline artifact {}: {e}",
                path.display()
            ))
        })?;
        if !pipeline.is_trained() {
            return Err(SpamError::serialization(format!(
                "artifact {} does not contain a trained pipeline",
                path.display()
            )));
        }

        log::debug!(
            "Loaded pipeline from {} ({} features)",
            path.display(),
            pipeline.vocabulary_size()
        );
        Ok(pipeline)
    }
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".tmp-{}", std::process::id()));
    path.with_file_name(name)
}

impl SpamClassifier for SpamPipeline {
    fn predict(&self, message: &str) -> Result<Prediction> {
        let spam_probability = self.spam_probability(message)?;
        Ok(Prediction {
            message: message.to_string(),
            label: crate::ml::logistic::label_for(spam_probability),
            spam_probability,
        })
    }

    fn is_trained(&self) -> bool {
        self.vectorizer.is_fitted() && self.classifier.is_fitted()
    }

    fn name(&self) -> &str {
        PIPELINE_NAME
    }
}
