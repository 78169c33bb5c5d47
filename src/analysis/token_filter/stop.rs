//! Stop filter implementation.
//!
//! This module provides a filter that removes common words (stop words) that
//! typically don't contribute to search relevance. A default English list is
//! built in, and larger lists such as the SMART stopword list can be loaded
//! from a file with one word per line.
//!
//! # Examples
//!
//! ```
//! use pilum::analysis::token_filter::Filter;
//! use pilum::analysis::token_filter::stop::StopFilter;
//! use pilum::analysis::token::Token;
//!
//! let filter = StopFilter::new(); // Uses default English stop words
//! let tokens = vec![
//!     Token::new("the", 0),
//!     Token::new("quick", 1),
//!     Token::new("brown", 2)
//! ];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! // "the" is removed as a stop word
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0].text, "quick");
//! assert_eq!(result[1].text, "brown");
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Default English stop words list.
///
/// Common English words that are typically filtered out during indexing.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Default English stop words as a HashSet.
pub static DEFAULT_ENGLISH_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});

/// A filter that removes stop words from the token stream.
///
/// Stop words are common words (like "the", "is", "at") that are often
/// filtered out during text analysis because they typically don't contribute
/// to search relevance. Removing them before feedback estimation also keeps
/// them out of the candidate pool for expansion terms.
///
/// # Examples
///
/// ## Basic Usage
///
/// ```
/// use pilum::analysis::token_filter::Filter;
/// use pilum::analysis::token_filter::stop::StopFilter;
/// use pilum::analysis::token::Token;
///
/// let filter = StopFilter::new();
/// let tokens = vec![
///     Token::new("this", 0),
///     Token::new("is", 1),
///     Token::new("test", 2)
/// ];
///
/// let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
///     .unwrap()
///     .collect();
///
/// // Only "test" remains
/// assert_eq!(result.len(), 1);
/// assert_eq!(result[0].text, "test");
/// ```
///
/// ## Custom Stop Words
///
/// ```
/// use pilum::analysis::token_filter::stop::StopFilter;
///
/// let filter = StopFilter::from_words(vec!["custom", "words", "list"]);
/// ```
#[derive(Clone, Debug)]
pub struct StopFilter {
    /// The set of stop words to remove
    stop_words: Arc<HashSet<String>>,
}

impl StopFilter {
    /// Create a new stop filter with the default English stop words.
    ///
    /// # Examples
    ///
    /// ```
    /// use pilum::analysis::token_filter::stop::StopFilter;
    ///
    /// let filter = StopFilter::new();
    /// assert!(filter.is_stop_word("the"));
    /// assert!(!filter.is_stop_word("hello"));
    /// ```
    pub fn new() -> Self {
        Self::with_stop_words(DEFAULT_ENGLISH_STOP_WORDS_SET.clone())
    }

    /// Create a new stop filter with custom stop words.
    ///
    /// # Arguments
    ///
    /// * `stop_words` - A set of words to filter out
    pub fn with_stop_words(stop_words: HashSet<String>) -> Self {
        StopFilter {
            stop_words: Arc::new(stop_words),
        }
    }

    /// Create a new stop filter from a list of stop words.
    ///
    /// # Arguments
    ///
    /// * `words` - An iterator of words to filter out
    ///
    /// # Examples
    ///
    /// ```
    /// use pilum::analysis::token_filter::stop::StopFilter;
    ///
    /// let filter = StopFilter::from_words(vec!["foo", "bar", "baz"]);
    /// assert_eq!(filter.len(), 3);
    /// ```
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stop_words = words.into_iter().map(|s| s.into()).collect();
        Self::with_stop_words(stop_words)
    }

    /// Create a new stop filter from a stopword file.
    ///
    /// The file holds one word per line. Blank lines and lines starting with
    /// `#` are skipped, so annotated lists like the SMART stopword file load
    /// as-is.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);

        let mut stop_words = HashSet::new();
        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            stop_words.insert(word.to_string());
        }

        Ok(Self::with_stop_words(stop_words))
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens: Vec<Token> = tokens
            .filter(|token| !self.is_stop_word(&token.text))
            .collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
