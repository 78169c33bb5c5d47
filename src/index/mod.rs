//! Index module for Pilum.
//!
//! This module provides the searchable-index abstraction the retrieval
//! pipeline runs against, an in-memory implementation of it, and corpus
//! loading.

pub mod corpus;
pub mod memory;
pub mod searcher;
pub mod types;

// Re-export commonly used types
pub use corpus::{CorpusDocument, read_jsonl};
pub use memory::{MemoryIndex, SharedIndex, index_from_pairs};
pub use searcher::SearchIndex;
pub use types::{DocumentVector, ScoredDoc, TermStatistics, TopDocs};
