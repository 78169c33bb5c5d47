//! Regex-based tokenizer implementation.

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{PilumError, Result};
use regex::Regex;
use std::sync::Arc;

/// A tokenizer that emits every match of a regular expression as a token.
///
/// The default pattern `r"\w+"` matches runs of word characters, which mirrors
/// the letter-run tokenization conventionally used for TREC-style ad hoc
/// retrieval corpora.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    /// The regex pattern used to extract tokens
    pattern: Arc<Regex>,
}

impl RegexTokenizer {
    /// Create a new regex tokenizer with the default word pattern.
    pub fn new() -> Result<Self> {
        Self::with_pattern(r"\w+")
    }

    /// Create a new regex tokenizer with a custom pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| PilumError::analysis(format!("Invalid regex pattern: {e}")))?;

        Ok(RegexTokenizer {
            pattern: Arc::new(regex),
        })
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for RegexTokenizer {
    fn default() -> Self {
        Self::new().expect("default regex pattern should be valid")
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, m)| Token::with_offsets(m.as_str(), position, m.start(), m.end()))
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
    fn test_default_pattern() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let tokens: Vec<Token> = tokenizer
            .tokenize("International Organized Crime")
            .unwrap()
            .collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "International");
        assert_eq!(tokens[1].text, "Organized");
        assert_eq!(tokens[2].text, "Crime");
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[2].position, 2);
    }

    #[test]
    fn test_offsets() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("oil spills").unwrap().collect();

        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 3);
        assert_eq!(tokens[1].start_offset, 4);
        assert_eq!(tokens[1].end_offset, 10);
    }

    #[test]
    fn test_punctuation_is_dropped() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let tokens: Vec<Token> = tokenizer
            .tokenize("U.S. oil industry: prices, profits")
            .unwrap()
            .collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["U", "S", "oil", "industry", "prices", "profits"]);
    }

    #[test]
    fn test_custom_pattern() {
        let tokenizer = RegexTokenizer::with_pattern(r"[a-z]+").unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("abc123def").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "abc");
        assert_eq!(tokens[1].text, "def");
    }

    #[test]
    fn test_invalid_pattern() {
        let result = RegexTokenizer::with_pattern("[invalid");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_text() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("").unwrap().collect();
        assert!(tokens.is_empty());
    }
}
