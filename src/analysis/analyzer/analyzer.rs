//! Core analyzer trait definition.
//!
//! This module defines the [`Analyzer`] trait, the main interface for text
//! analysis in Pilum. Analyzers combine a tokenizer with a chain of filters to
//! transform raw text into the terms used for retrieval and feedback.
//!
//! # Role in Analysis Pipeline
//!
//! ```text
//! Raw Text → Analyzer → Token Stream
//!             ↓
//!         Tokenizer
//!             ↓
//!         Filter 1
//!             ↓
//!         Filter N
//! ```
//!
//! The same analyzer must be applied to topic titles and to indexed document
//! text, otherwise query tokens and cached term statistics will disagree.
//!
//! # Examples
//!
//! Using a built-in analyzer:
//!
//! ```
//! use pilum::analysis::analyzer::Analyzer;
//! use pilum::analysis::analyzer::StandardAnalyzer;
//!
//! let analyzer = StandardAnalyzer::new().unwrap();
//! let tokens: Vec<_> = analyzer.analyze("Hello World").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[1].text, "world");
//! ```
//!
//! Implementing a custom analyzer:
//!
//! ```
//! use pilum::analysis::analyzer::Analyzer;
//! use pilum::analysis::token::TokenStream;
//! use pilum::error::Result;
//!
//! struct MyAnalyzer;
//!
//! impl Analyzer for MyAnalyzer {
//!     fn analyze(&self, text: &str) -> Result<TokenStream> {
//!         // Custom analysis logic here
//!         Ok(Box::new(std::iter::empty()))
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "my_analyzer"
//!     }
//! }
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// # Thread Safety
///
/// The trait requires `Send + Sync` so a single analyzer can be shared across
/// worker threads when topics are processed in parallel.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    ///
    /// This runs the complete analysis pipeline, including tokenization and
    /// all configured filters.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}
