//! The searchable-index abstraction used by the retrieval pipeline.

use crate::error::Result;
use crate::index::types::{DocumentVector, TermStatistics, TopDocs};
use crate::query::BooleanQuery;

/// Trait for indexes that support ranked retrieval and feedback statistics.
///
/// The retrieval pipeline is written against this trait so the feedback
/// machinery can run over any backend that exposes postings-level statistics.
/// All methods take `&self`; implementations must be usable from multiple
/// threads at once.
pub trait SearchIndex: Send + Sync + std::fmt::Debug {
    /// Get the number of documents in the index.
    fn doc_count(&self) -> u64;

    /// Get the total number of token occurrences in a field across the
    /// collection (the sum of collection frequencies over all terms).
    ///
    /// This is the denominator of the collection language model.
    fn vocabulary_size(&self, field: &str) -> Result<u64>;

    /// Get corpus statistics for a term, or `None` if the term does not occur
    /// in the field.
    fn term_statistics(&self, field: &str, term: &str) -> Result<Option<TermStatistics>>;

    /// Get the stored term-frequency vector for one field of one document, or
    /// `None` if the document has no terms in that field.
    fn document_vector(&self, doc_id: u64, field: &str) -> Result<Option<DocumentVector>>;

    /// Get the external identifier (document name) for an internal doc ID.
    fn external_id(&self, doc_id: u64) -> Result<Option<String>>;

    /// Execute a boolean query, returning up to `top_k` ranked hits.
    fn search(&self, query: &BooleanQuery, top_k: usize) -> Result<TopDocs>;
}
