//! Token types for text analysis.
//!
//! Tokens are the unit that flows through the analysis pipeline: the topic
//! title is analyzed into tokens before the initial retrieval, and the same
//! token stream drives query-likelihood and query-mixing computations in the
//! feedback stage.
//!
//! # Examples
//!
//! ```
//! use pilum::analysis::token::Token;
//!
//! let token = Token::new("hello", 0);
//! assert_eq!(token.text, "hello");
//! assert_eq!(token.position, 0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token.
    pub text: String,

    /// The position of the token in the token stream (0-based).
    pub position: usize,

    /// The byte offset where this token starts in the original text.
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text.
    pub end_offset: usize,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
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
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
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

/// A token stream is a sequence of tokens produced by the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;
