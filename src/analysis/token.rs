//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows through the analysis pipeline: the
//! tokenizer produces them from raw message text, filters rewrite them, and the
//! TF-IDF vectorizer turns their texts into n-gram terms.
//!
//! ```
//! use spam_detector::analysis::token::Token;
//!
//! let token = Token::with_offsets("prize", 3, 17, 22);
//! assert_eq!(token.text, "prize");
//! assert_eq!(token.position, 3);
//! assert_eq!(token.end_offset - token.start_offset, 5);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Whether this token has been marked as stopped (removed) by a filter
    pub stopped: bool,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            stopped: false,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check if this token is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Clone this token with updated text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hello", 0);
        assert_eq!(token.text, "hello");
        assert_eq!(token.position, 0);
        assert_eq!(token.start_offset, 0);
        assert_eq!(token.end_offset, 0);
        assert!(!token.is_stopped());
        assert_eq!(token.len(), 5);
    }

    #[test]
    fn test_token_with_text_keeps_offsets() {
        let token = Token::with_offsets("WINNER", 0, 0, 6);
        let lowered = token.with_text("winner");

        assert_eq!(lowered.text, "winner");
        assert_eq!(lowered.start_offset, 0);
        assert_eq!(lowered.end_offset, 6);
        assert_eq!(token.text, "WINNER");
    }

    #[test]
    fn test_token_stop() {
        let token = Token::new("the", 1).stop();
        assert!(token.is_stopped());
        assert_eq!(token.to_string(), "the");
    }
}
