//! Error types for the spam detector.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`SpamError`] enum. Constructor helpers keep call sites short:
//!
//! ```
//! use spam_detector::error::{Result, SpamError};
//!
//! fn check(c: f64) -> Result<()> {
//!     if c <= 0.0 {
//!         return Err(SpamError::invalid_config("C must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(-1.0).is_err());
//! ```

use std::io;
use std::path::Path;

use thiserror::Error;

/// The main error type for spam detector operations.
#[derive(Error, Debug)]
pub enum SpamError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV decoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Artifact encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The persisted pipeline does not exist
    #[error("Model artifact not found: {path}")]
    ArtifactNotFound { path: String },

    /// Training data that cannot be used (bad label, wrong column count, empty corpus)
    #[error("Malformed training data: {0}")]
    MalformedData(String),

    /// Inference was attempted before fitting
    #[error("Model not trained: {0}")]
    NotTrained(String),

    /// Fitting was attempted on an already fitted pipeline
    #[error("Model already trained: {0}")]
    AlreadyTrained(String),

    /// Invalid argument supplied by a caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure while fitting a model
    #[error("Training error: {0}")]
    Training(String),
}

/// Result type alias for operations that may fail with SpamError.
pub type Result<T> = std::result::Result<T, SpamError>;

impl SpamError {
    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SpamError::Serialization(msg.into())
    }

    /// Create a new artifact-not-found error for a path.
    pub fn artifact_not_found<P: AsRef<Path>>(path: P) -> Self {
        SpamError::ArtifactNotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Create a new malformed data error.
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        SpamError::MalformedData(msg.into())
    }

    /// Create a new not trained error.
    pub fn not_trained<S: Into<String>>(msg: S) -> Self {
        SpamError::NotTrained(msg.into())
    }

    /// Create a new already trained error.
    pub fn already_trained<S: Into<String>>(msg: S) -> Self {
        SpamError::AlreadyTrained(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SpamError::InvalidArgument(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        SpamError::InvalidConfig(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        SpamError::Training(msg.into())
    }

    /// Whether this error means the artifact file is missing.
    pub fn is_artifact_not_found(&self) -> bool {
        matches!(self, SpamError::ArtifactNotFound { .. })
    }
}

impl From<bincode::Error> for SpamError {
    fn from(err: bincode::Error) -> Self {
        SpamError::Serialization(err.to_string())
    }
}
