//! Text analysis for SMS messages.
//!
//! Tokenization, token filtering and analyzer pipelines, plus word n-gram
//! expansion used by the TF-IDF vectorizer.

pub mod analyzer;
pub mod ngram;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::*;
pub use ngram::word_ngrams;
pub use token::*;
pub use token_filter::*;
pub use tokenizer::*;
