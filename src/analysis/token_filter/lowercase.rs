//! Lowercase filter implementation.
//!
//! ```
//! use spam_detector::analysis::token::Token;
//! use spam_detector::analysis::token_filter::Filter;
//! use spam_detector::analysis::token_filter::lowercase::LowercaseFilter;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("FREE", 0), Token::new("Entry", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "free");
//! assert_eq!(filtered[1].text, "entry");
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that converts tokens to lowercase.
///
/// Stopped tokens pass through untouched. Positions and offsets are preserved.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    token
                } else if token.text.is_ascii() {
                    let lowered = token.text.to_ascii_lowercase();
                    token.with_text(lowered)
                } else {
                    let lowered = token.text.to_lowercase();
                    token.with_text(lowered)
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_lowercase_filter() {
        let filter = LowercaseFilter::new();
        let tokens = vec![
            Token::new("Hello", 0),
            Token::new("WINNER", 1),
            Token::new("ÉTÉ", 2),
            Token::new("Test", 3).stop(),
        ];
        let token_stream = Box::new(tokens.into_iter());

        let result: Vec<Token> = filter.filter(token_stream).unwrap().collect();

        assert_eq!(result.len(), 4);
        assert_eq!(result[0].text, "hello");
        assert_eq!(result[1].text, "winner");
        assert_eq!(result[2].text, "été");
        assert_eq!(result[3].text, "Test"); // Stopped tokens are not processed
        assert!(result[3].is_stopped());
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(LowercaseFilter::new().name(), "lowercase");
    }
}
