//! Regex-based tokenizer implementation.

use std::sync::Arc;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{Result, SpamError};

/// Word pattern used for SMS text: runs of two or more Unicode word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// A regex-based tokenizer that extracts every match of a pattern as a token.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    /// The regex pattern used to extract tokens
    pattern: Arc<Regex>,
}

impl RegexTokenizer {
    /// Create a new regex tokenizer with [`DEFAULT_TOKEN_PATTERN`].
    pub fn new() -> Result<Self> {
        Self::with_pattern(DEFAULT_TOKEN_PATTERN)
    }

    /// Create a new regex tokenizer with a custom pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| SpamError::invalid_config(format!("Invalid token pattern: {e}")))?;

        Ok(RegexTokenizer {
            pattern: Arc::new(regex),
        })
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, mat)| {
                Token::with_offsets(mat.as_str(), position, mat.start(), mat.end())
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_tokenizer() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("Call now").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "Call");
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 4);

        assert_eq!(tokens[1].text, "now");
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].start_offset, 5);
        assert_eq!(tokens[1].end_offset, 8);
    }

    #[test]
    fn test_single_characters_and_punctuation_are_dropped() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let texts: Vec<String> = tokenizer
            .tokenize("U have won a £900 prize!!")
            .unwrap()
            .map(|t| t.text)
            .collect();

        assert_eq!(texts, vec!["have", "won", "900", "prize"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let result = RegexTokenizer::with_pattern("(unclosed");
        assert!(matches!(result, Err(SpamError::InvalidConfig(_))));
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(RegexTokenizer::new().unwrap().name(), "regex");
    }
}
