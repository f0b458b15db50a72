//! Machine learning components of the spam detector.
//!
//! - [`tfidf`]: text → sparse TF-IDF feature vectors
//! - [`logistic`]: binary logistic regression over those vectors, fitted with argmin's L-BFGS
//! - [`dataset`], [`metrics`]: labeled corpora and held-out evaluation
//! - [`models`], [`cache`]: the classifier interface and the load-once cache

pub mod cache;
pub mod dataset;
pub mod logistic;
pub mod metrics;
pub mod models;
pub mod tfidf;

pub use cache::ModelCache;
pub use dataset::{Dataset, Label, LabeledMessage};
pub use logistic::{ClassWeight, LogisticRegression, LogisticRegressionConfig};
pub use metrics::{ClassificationReport, ConfusionMatrix};
pub use models::{ModelMetadata, Prediction, SpamClassifier};
pub use tfidf::{Norm, TfIdfConfig, TfIdfVectorizer, Vocabulary};
