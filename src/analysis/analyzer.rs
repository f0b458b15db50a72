//! Analyzer implementations that combine tokenizers and filters.
//!
//! ```text
//! Raw Text → Analyzer → Token Stream → Vectorizer
//!             ↓
//!         Tokenizer
//!             ↓
//!         Filter 1 .. N
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Analyze the text and collect only the token texts, skipping stopped tokens.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .analyze(text)?
            .filter(|token| !token.is_stopped())
            .map(|token| token.text)
            .collect())
    }
}

mod pipeline;
mod standard;

pub use pipeline::PipelineAnalyzer;
pub use standard::{StandardAnalyzer, StandardAnalyzerConfig};
