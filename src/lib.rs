//! # spam-detector
//!
//! SMS spam classification with TF-IDF features and logistic regression.
//!
//! ## Features
//!
//! - Word unigram and bigram TF-IDF vectorization with a bounded vocabulary
//! - Class-balanced, L2-regularized logistic regression fitted with L-BFGS
//! - Stratified train/test split and held-out evaluation
//! - Single-file pipeline artifact with a load-once cache
//!
//! ```no_run
//! use spam_detector::ml::SpamClassifier;
//! use spam_detector::pipeline::SpamPipeline;
//!
//! let pipeline = SpamPipeline::load("models/spam_classifier.bin")?;
//! let prediction = pipeline.predict("WINNER!! Claim your prize now")?;
//! println!("{} ({:.1}%)", prediction.label, prediction.spam_probability * 100.0);
//! # Ok::<(), spam_detector::error::SpamError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod ml;
pub mod pipeline;
pub mod training;

pub mod prelude {
    pub use crate::config::TrainingConfig;
    pub use crate::error::{Result, SpamError};
    pub use crate::ml::{Label, Prediction, SpamClassifier};
    pub use crate::pipeline::SpamPipeline;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
