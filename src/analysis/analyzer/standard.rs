//! Standard analyzer for SMS text.
//!
//! # Pipeline
//!
//! 1. RegexTokenizer (`\b\w\w+\b` by default)
//! 2. LowercaseFilter (optional, on by default)
//!
//! No stop words are removed.
//!
//! The analyzer serializes as its [`StandardAnalyzerConfig`], so it can be
//! persisted inside a trained pipeline and rebuilt on load.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Analyzer;
use super::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::LowercaseFilter;
use crate::analysis::tokenizer::RegexTokenizer;
use crate::analysis::tokenizer::regex::DEFAULT_TOKEN_PATTERN;
use crate::error::{Result, SpamError};

/// Serializable description of a [`StandardAnalyzer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardAnalyzerConfig {
    /// Regular expression whose matches become tokens.
    pub token_pattern: String,
    /// Lowercase every token before n-gram expansion.
    pub lowercase: bool,
}

impl Default for StandardAnalyzerConfig {
    fn default() -> Self {
        Self {
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            lowercase: true,
        }
    }
}

/// The analyzer used by the TF-IDF vectorizer.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "StandardAnalyzerConfig", into = "StandardAnalyzerConfig")]
pub struct StandardAnalyzer {
    config: StandardAnalyzerConfig,
    inner: PipelineAnalyzer,
}

impl StandardAnalyzer {
    /// Create a new standard analyzer with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(StandardAnalyzerConfig::default())
    }

    /// Create an analyzer from an explicit configuration.
    pub fn with_config(config: StandardAnalyzerConfig) -> Result<Self> {
        let tokenizer = Arc::new(RegexTokenizer::with_pattern(&config.token_pattern)?);
        let mut inner = PipelineAnalyzer::new(tokenizer);
        if config.lowercase {
            inner = inner.add_filter(Arc::new(LowercaseFilter::new()));
        }
        let inner = inner.with_name("standard");

        Ok(StandardAnalyzer { config, inner })
    }

    /// The configuration this analyzer was built from.
    pub fn config(&self) -> &StandardAnalyzerConfig {
        &self.config
    }

    /// Get the inner pipeline analyzer.
    pub fn inner(&self) -> &PipelineAnalyzer {
        &self.inner
    }
}

impl TryFrom<StandardAnalyzerConfig> for StandardAnalyzer {
    type Error = SpamError;

    fn try_from(config: StandardAnalyzerConfig) -> Result<Self> {
        Self::with_config(config)
    }
}

impl From<StandardAnalyzer> for StandardAnalyzerConfig {
    fn from(analyzer: StandardAnalyzer) -> Self {
        analyzer.config
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

impl std::fmt::Debug for StandardAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardAnalyzer")
            .field("config", &self.config)
            .field("inner", &self.inner)
            .finish()
    }
}
