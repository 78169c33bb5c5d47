//! Text analysis module for Pilum.
//!
//! This module provides the text analysis functionality used on both sides of
//! the retrieval pipeline: tokenization, filtering, and analyzer pipelines.
//! Topic titles and document text must pass through the same analyzer so that
//! query tokens line up with indexed terms and their cached statistics.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::*;
pub use token::*;
pub use token_filter::*;
pub use tokenizer::*;
