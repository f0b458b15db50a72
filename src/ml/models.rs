//! Classifier interface, prediction results and model metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::dataset::Label;

/// A trained text classifier that labels one message at a time.
pub trait SpamClassifier: Send + Sync {
    /// Classify a single message.
    fn predict(&self, message: &str) -> Result<Prediction>;

    /// Classify several messages in order.
    fn predict_batch(&self, messages: &[String]) -> Result<Vec<Prediction>> {
        messages.iter().map(|m| self.predict(m)).collect()
    }

    /// Check if the model is trained and ready for predictions.
    fn is_trained(&self) -> bool;

    /// Short model identifier.
    fn name(&self) -> &str;
}

/// Outcome of classifying one message. Created per call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub message: String,
    pub label: Label,
    /// Probability in [0, 1] that the message is spam.
    pub spam_probability: f64,
}

impl Prediction {
    pub fn is_spam(&self) -> bool {
        self.label.is_spam()
    }

    /// Probability of the predicted label.
    pub fn confidence(&self) -> f64 {
        match self.label {
            Label::Spam => self.spam_probability,
            Label::Ham => 1.0 - self.spam_probability,
        }
    }
}

/// Information recorded about a training run and stored with the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier.
    pub name: String,
    /// Crate version that produced the artifact.
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub training_examples: usize,
    pub test_examples: usize,
    pub spam_count: usize,
    pub ham_count: usize,
    pub vocabulary_size: usize,
    /// Held-out accuracy, when an evaluation split was used.
    pub accuracy: Option<f64>,
    pub iterations: usize,
    pub converged: bool,
    pub hyperparameters: BTreeMap<String, f64>,
}

impl ModelMetadata {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            version: crate::VERSION.to_string(),
            trained_at: Utc::now(),
            training_examples: 0,
            test_examples: 0,
            spam_count: 0,
            ham_count: 0,
            vocabulary_size: 0,
            accuracy: None,
            iterations: 0,
            converged: false,
            hyperparameters: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence() {
        let spam = Prediction {
            message: "WIN".to_string(),
            label: Label::Spam,
            spam_probability: 0.9,
        };
        assert!(spam.is_spam());
        assert!((spam.confidence() - 0.9).abs() < 1e-12);

        let ham = Prediction {
            message: "lunch?".to_string(),
            label: Label::Ham,
            spam_probability: 0.2,
        };
        assert!(!ham.is_spam());
        assert!((ham.confidence() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_prediction_json() {
        let prediction = Prediction {
            message: "hi".to_string(),
            label: Label::Ham,
            spam_probability: 0.25,
        };
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!(json["label"], "ham");
        assert_eq!(json["spam_probability"], 0.25);
    }

    #[test]
    fn test_metadata_defaults() {
        let metadata = ModelMetadata::new("tfidf-logreg");
        assert_eq!(metadata.name, "tfidf-logreg");
        assert_eq!(metadata.version, crate::VERSION);
        assert!(metadata.accuracy.is_none());
    }
}
