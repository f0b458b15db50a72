//! Training configuration.
//!
//! Every field has a default, so a JSON file only needs the values it wants to
//! change:
//!
//! ```json
//! { "test_size": 0.25, "classifier": { "c": 1.0 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamError};
use crate::ml::logistic::LogisticRegressionConfig;
use crate::ml::tfidf::TfIdfConfig;

/// Default location of the persisted pipeline.
pub const DEFAULT_MODEL_PATH: &str = "models/spam_classifier.bin";

/// Settings for one offline training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub vectorizer: TfIdfConfig,
    pub classifier: LogisticRegressionConfig,
    /// Fraction of each class held out for evaluation.
    pub test_size: f64,
    pub random_seed: u64,
    /// Whether the CSV starts with a header row.
    pub has_headers: bool,
    /// Held-out accuracy below which a warning is logged.
    pub accuracy_target: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vectorizer: TfIdfConfig::default(),
            classifier: LogisticRegressionConfig::default(),
            test_size: 0.2,
            random_seed: 42,
            has_headers: false,
            accuracy_target: 0.95,
        }
    }
}

impl TrainingConfig {
    /// Read a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: TrainingConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(SpamError::invalid_config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if !(0.0..=1.0).contains(&self.accuracy_target) {
            return Err(SpamError::invalid_config(format!(
                "accuracy_target must be in [0, 1], got {}",
                self.accuracy_target
            )));
        }
        self.vectorizer.validate()?;
        self.classifier.validate()
    }
}
