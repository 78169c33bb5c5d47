//! Lowercase filter implementation.
//!
//! This module provides a filter that converts all token text to lowercase.
//! Index terms and query terms must agree on casing for term statistics and
//! feedback weights to line up, so this filter runs in every analyzer chain.
//!
//! # Examples
//!
//! ```
//! use pilum::analysis::token_filter::Filter;
//! use pilum::analysis::token_filter::lowercase::LowercaseFilter;
//! use pilum::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Oil", 0), Token::new("SPILLS", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "oil");
//! assert_eq!(filtered[1].text, "spills");
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that converts tokens to lowercase.
///
/// # Behavior
///
/// - Converts all characters to lowercase (Unicode-aware)
/// - Preserves token positions and offsets
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
                let lowered = token.text.to_lowercase();
                token.with_text(lowered)
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
