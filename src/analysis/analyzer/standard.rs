//! Standard analyzer that provides good defaults for most use cases.
//!
//! This analyzer uses a regex tokenizer, lowercase normalization, and English
//! stop word filtering. It's suitable for TREC-style English corpora and is
//! the default analyzer for both indexing and topic processing.
//!
//! # Pipeline
//!
//! 1. RegexTokenizer (word-character runs)
//! 2. LowercaseFilter
//! 3. StopFilter (33 common English stop words, or a list loaded from file)
//!
//! # Examples
//!
//! ```
//! use pilum::analysis::analyzer::Analyzer;
//! use pilum::analysis::analyzer::StandardAnalyzer;
//!
//! let analyzer = StandardAnalyzer::new().unwrap();
//! let tokens: Vec<_> = analyzer.analyze("Hello the world and test").unwrap().collect();
//!
//! // "the" and "and" are filtered out as stop words
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[1].text, "world");
//! assert_eq!(tokens[2].text, "test");
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::error::Result;

/// A standard analyzer that provides good defaults for most use cases.
///
/// This analyzer uses a regex tokenizer with lowercase and stop word filtering.
pub struct StandardAnalyzer {
    inner: PipelineAnalyzer,
}

impl StandardAnalyzer {
    /// Create a new standard analyzer with default settings.
    pub fn new() -> Result<Self> {
        Self::with_stop_filter(StopFilter::new())
    }

    /// Create a new standard analyzer whose stopword list is loaded from a
    /// file (one word per line, `#` comments allowed).
    ///
    /// Retrieval experiments usually want a larger list than the built-in
    /// default, such as the SMART stopword list.
    pub fn with_stop_words_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_stop_filter(StopFilter::from_file(path)?)
    }

    /// Create a new standard analyzer with a custom stop filter.
    pub fn with_stop_filter(stop_filter: StopFilter) -> Result<Self> {
        let tokenizer = Arc::new(RegexTokenizer::new()?);
        let analyzer = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(stop_filter))
            .with_name("standard".to_string());

        Ok(StandardAnalyzer { inner: analyzer })
    }

    /// Create a new standard analyzer without stop word filtering.
    pub fn without_stop_words() -> Result<Self> {
        let tokenizer = Arc::new(RegexTokenizer::new()?);
        let analyzer = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(LowercaseFilter::new()))
            .with_name("standard_no_stop".to_string());

        Ok(StandardAnalyzer { inner: analyzer })
    }

    /// Get the inner pipeline analyzer.
    pub fn inner(&self) -> &PipelineAnalyzer {
        &self.inner
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new().expect("Standard analyzer should be creatable with default settings")
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
            .field("inner", &self.inner)
            .finish()
    }
}
