//! Core data types shared by index implementations.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Corpus-level statistics for a single term in a field.
///
/// These are the statistics the feedback stage caches once per query so that
/// weighting never goes back to the index mid-estimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStatistics {
    /// The term text.
    pub term: String,
    /// Number of documents containing this term.
    pub doc_freq: u64,
    /// Total number of occurrences of this term across the collection.
    pub collection_freq: u64,
}

impl TermStatistics {
    /// Create new term statistics.
    pub fn new<S: Into<String>>(term: S, doc_freq: u64, collection_freq: u64) -> Self {
        TermStatistics {
            term: term.into(),
            doc_freq,
            collection_freq,
        }
    }
}

/// Within-document term frequencies for one field of one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentVector {
    /// Term frequencies keyed by term text.
    terms: AHashMap<String, u64>,
    /// Total number of token occurrences in this field (the document length).
    length: u64,
}

impl DocumentVector {
    /// Create an empty document vector.
    pub fn new() -> Self {
        DocumentVector::default()
    }

    /// Build a document vector from a sequence of analyzed terms.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vector = DocumentVector::new();
        for term in terms {
            vector.push(term);
        }
        vector
    }

    /// Record one occurrence of a term.
    pub fn push<S: Into<String>>(&mut self, term: S) {
        *self.terms.entry(term.into()).or_insert(0) += 1;
        self.length += 1;
    }

    /// Get the frequency of a term in this document (0 if absent).
    pub fn term_freq(&self, term: &str) -> u64 {
        self.terms.get(term).copied().unwrap_or(0)
    }

    /// Get the document length (total token occurrences).
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Get the number of distinct terms.
    pub fn distinct_terms(&self) -> usize {
        self.terms.len()
    }

    /// Check whether the vector holds no terms.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Iterate over `(term, frequency)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.terms.iter().map(|(term, freq)| (term.as_str(), *freq))
    }
}

/// A document matched by a query, with its retrieval score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    /// The internal document ID.
    pub doc_id: u64,
    /// The relevance score.
    pub score: f32,
}

impl ScoredDoc {
    /// Create a new scored document.
    pub fn new(doc_id: u64, score: f32) -> Self {
        ScoredDoc { doc_id, score }
    }
}

/// Ranked search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopDocs {
    /// The ranked hits, best first.
    pub score_docs: Vec<ScoredDoc>,
    /// Total number of documents that matched the query.
    pub total_hits: u64,
}

impl TopDocs {
    /// Create empty results.
    pub fn empty() -> Self {
        TopDocs::default()
    }

    /// Create results from ranked hits.
    pub fn new(score_docs: Vec<ScoredDoc>, total_hits: u64) -> Self {
        TopDocs {
            score_docs,
            total_hits,
        }
    }

    /// Get the number of returned hits.
    pub fn len(&self) -> usize {
        self.score_docs.len()
    }

    /// Check whether no hits were returned.
    pub fn is_empty(&self) -> bool {
        self.score_docs.is_empty()
    }
}
