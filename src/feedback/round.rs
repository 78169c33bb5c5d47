//! Per-query feedback statistics collection.
//!
//! A [`FeedbackRound`] gathers everything the weighting estimators read: the
//! kept feedback documents with their term vectors, corpus statistics for
//! every distinct term those vectors contain, the collection token count, and
//! each document's query likelihood. It is built once per query and immutable
//! afterwards, so estimators for different queries never share state.

use ahash::AHashMap;

use crate::error::Result;
use crate::feedback::language_model::SmoothedLanguageModel;
use crate::index::searcher::SearchIndex;
use crate::index::types::{DocumentVector, TermStatistics, TopDocs};

/// One kept feedback document.
#[derive(Debug, Clone)]
pub struct FeedbackDocument {
    /// Internal doc ID in the index.
    pub doc_id: u64,
    /// The document's term vector for the feedback field.
    pub vector: DocumentVector,
    /// Product of smoothed query-term probabilities against this document.
    pub query_likelihood: f64,
}

/// Immutable statistics context for one query's feedback stage.
#[derive(Debug, Clone)]
pub struct FeedbackRound {
    docs: Vec<FeedbackDocument>,
    term_stats: AHashMap<String, TermStatistics>,
    vocabulary_size: u64,
    doc_count: u64,
    mixing_lambda: f64,
}

impl FeedbackRound {
    /// Collect feedback statistics from the initial retrieval result.
    ///
    /// Examines only the first `min(num_feedback_docs, hits)` ranked
    /// positions. A ranked document with no retrievable vector for
    /// `feedback_field` is skipped, and no replacement is drawn from deeper
    /// in the ranking, so the kept set can fall short of the cap. Corpus
    /// statistics are fetched exactly once per distinct term across the kept
    /// vectors; index read errors propagate.
    pub fn collect(
        index: &dyn SearchIndex,
        hits: &TopDocs,
        query_tokens: &[String],
        feedback_field: &str,
        num_feedback_docs: usize,
        mixing_lambda: f64,
    ) -> Result<Self> {
        let mut pending: Vec<(u64, DocumentVector)> = Vec::new();
        let mut term_stats: AHashMap<String, TermStatistics> = AHashMap::new();

        let depth = num_feedback_docs.min(hits.score_docs.len());
        for scored in &hits.score_docs[..depth] {
            let Some(vector) = index.document_vector(scored.doc_id, feedback_field)? else {
                continue;
            };

            for (term, _) in vector.iter() {
                if term_stats.contains_key(term) {
                    continue;
                }
                if let Some(stats) = index.term_statistics(feedback_field, term)? {
                    term_stats.insert(term.to_string(), stats);
                }
            }
            pending.push((scored.doc_id, vector));
        }

        let mut round = FeedbackRound {
            docs: Vec::with_capacity(pending.len()),
            term_stats,
            vocabulary_size: index.vocabulary_size(feedback_field)?,
            doc_count: index.doc_count(),
            mixing_lambda,
        };

        let model = SmoothedLanguageModel::new(&round);
        let likelihoods: Vec<f64> = pending
            .iter()
            .map(|(_, vector)| model.query_likelihood(vector, query_tokens))
            .collect();

        round.docs = pending
            .into_iter()
            .zip(likelihoods)
            .map(|((doc_id, vector), query_likelihood)| FeedbackDocument {
                doc_id,
                vector,
                query_likelihood,
            })
            .collect();

        Ok(round)
    }

    /// The kept feedback documents, in rank order.
    pub fn docs(&self) -> &[FeedbackDocument] {
        &self.docs
    }

    /// Number of kept feedback documents.
    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    /// Whether no feedback documents were kept.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Cached corpus statistics for a term, if the term occurred in the
    /// feedback set.
    pub fn term_stat(&self, term: &str) -> Option<&TermStatistics> {
        self.term_stats.get(term)
    }

    /// Iterate over all cached term statistics (the candidate vocabulary).
    pub fn term_stats(&self) -> impl Iterator<Item = &TermStatistics> {
        self.term_stats.values()
    }

    /// Number of distinct terms in the candidate vocabulary.
    pub fn num_terms(&self) -> usize {
        self.term_stats.len()
    }

    /// Total token occurrences in the feedback field across the collection.
    pub fn vocabulary_size(&self) -> u64 {
        self.vocabulary_size
    }

    /// Total documents in the index.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// The document/collection interpolation weight for smoothing.
    pub fn mixing_lambda(&self) -> f64 {
        self.mixing_lambda
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::analysis::analyzer::StandardAnalyzer;
    use crate::index::memory::MemoryIndex;
    use crate::index::types::ScoredDoc;
    use crate::query::BooleanQuery;

    /// Index double that hides vectors for chosen documents and counts
    /// statistics lookups.
    #[derive(Debug)]
    struct CountingIndex {
        inner: MemoryIndex,
        hidden: Vec<u64>,
        stat_calls: Mutex<Vec<String>>,
    }

    impl CountingIndex {
        fn new(inner: MemoryIndex, hidden: Vec<u64>) -> Self {
            CountingIndex {
                inner,
                hidden,
                stat_calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl SearchIndex for CountingIndex {
        fn doc_count(&self) -> u64 {
            self.inner.doc_count()
        }

        fn vocabulary_size(&self, field: &str) -> Result<u64> {
            self.inner.vocabulary_size(field)
        }

        fn term_statistics(&self, field: &str, term: &str) -> Result<Option<TermStatistics>> {
            self.stat_calls.lock().unwrap().push(term.to_string());
            self.inner.term_statistics(field, term)
        }

        fn document_vector(&self, doc_id: u64, field: &str) -> Result<Option<DocumentVector>> {
            if self.hidden.contains(&doc_id) {
                return Ok(None);
            }
            self.inner.document_vector(doc_id, field)
        }

        fn external_id(&self, doc_id: u64) -> Result<Option<String>> {
            self.inner.external_id(doc_id)
        }

        fn search(&self, query: &BooleanQuery, top_k: usize) -> Result<TopDocs> {
            self.inner.search(query, top_k)
        }
    }

    fn two_doc_index() -> MemoryIndex {
        let analyzer = Arc::new(StandardAnalyzer::without_stop_words().unwrap());
        let mut index = MemoryIndex::new(analyzer);
        index.add_document("doc1", &[("content", "a a b")]).unwrap();
        index.add_document("doc2", &[("content", "b c c c")]).unwrap();
        index
    }

    fn ranked(ids: &[u64]) -> TopDocs {
        let docs = ids
            .iter()
            .enumerate()
            .map(|(rank, &id)| ScoredDoc::new(id, 10.0 - rank as f32))
            .collect();
        TopDocs::new(docs, ids.len() as u64)
    }

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_collect_gathers_stats_and_vectors() {
        let index = two_doc_index();
        let round = FeedbackRound::collect(
            &index,
            &ranked(&[0, 1]),
            &tokens(&["b"]),
            "content",
            10,
            0.5,
        )
        .unwrap();

        assert_eq!(round.num_docs(), 2);
        assert_eq!(round.num_terms(), 3);
        assert_eq!(round.vocabulary_size(), 7);
        assert_eq!(round.doc_count(), 2);

        let stat_a = round.term_stat("a").unwrap();
        assert_eq!(stat_a.doc_freq, 1);
        assert_eq!(stat_a.collection_freq, 2);
        let stat_b = round.term_stat("b").unwrap();
        assert_eq!(stat_b.doc_freq, 2);
        assert_eq!(stat_b.collection_freq, 2);
        let stat_c = round.term_stat("c").unwrap();
        assert_eq!(stat_c.collection_freq, 3);
    }

    #[test]
    fn test_collect_computes_query_likelihoods() {
        let index = two_doc_index();
        let round = FeedbackRound::collect(
            &index,
            &ranked(&[0, 1]),
            &tokens(&["b"]),
            "content",
            10,
            0.5,
        )
        .unwrap();

        // smoothedMLE(b, doc1) = 0.5 * 1/3 + 0.5 * 2/7
        let expected_doc1 = 0.5 * (1.0 / 3.0) + 0.5 * (2.0 / 7.0);
        // smoothedMLE(b, doc2) = 0.5 * 1/4 + 0.5 * 2/7
        let expected_doc2 = 0.5 * (1.0 / 4.0) + 0.5 * (2.0 / 7.0);

        assert!((round.docs()[0].query_likelihood - expected_doc1).abs() < 1e-12);
        assert!((round.docs()[1].query_likelihood - expected_doc2).abs() < 1e-12);
        assert!((expected_doc1 - 0.3095).abs() < 1e-4);
    }

    #[test]
    fn test_collect_respects_document_cap() {
        let index = two_doc_index();
        let round = FeedbackRound::collect(
            &index,
            &ranked(&[0, 1]),
            &tokens(&["b"]),
            "content",
            1,
            0.5,
        )
        .unwrap();

        assert_eq!(round.num_docs(), 1);
        assert_eq!(round.docs()[0].doc_id, 0);
        // Terms from the second document never entered the cache.
        assert!(round.term_stat("c").is_none());
    }

    #[test]
    fn test_collect_draws_no_replacement_for_vectorless_docs() {
        let index = CountingIndex::new(two_doc_index(), vec![0]);

        // Only the top-ranked position is examined at cap 1; doc 0 yields no
        // vector and doc 1 is never considered.
        let round = FeedbackRound::collect(
            &index,
            &ranked(&[0, 1]),
            &tokens(&["b"]),
            "content",
            1,
            0.5,
        )
        .unwrap();
        assert!(round.is_empty());
        assert_eq!(round.num_terms(), 0);

        // At cap 2 the second position is in range, so doc 1 is kept and the
        // round falls one document short of the cap.
        let round = FeedbackRound::collect(
            &index,
            &ranked(&[0, 1]),
            &tokens(&["b"]),
            "content",
            2,
            0.5,
        )
        .unwrap();
        assert_eq!(round.num_docs(), 1);
        assert_eq!(round.docs()[0].doc_id, 1);
    }

    #[test]
    fn test_collect_fetches_each_term_stat_once() {
        let index = CountingIndex::new(two_doc_index(), vec![]);
        let round = FeedbackRound::collect(
            &index,
            &ranked(&[0, 1]),
            &tokens(&["b"]),
            "content",
            10,
            0.5,
        )
        .unwrap();

        assert_eq!(round.num_terms(), 3);
        let mut calls = index.stat_calls.lock().unwrap().clone();
        calls.sort();
        // "b" occurs in both documents but is fetched only once.
        assert_eq!(calls, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_collect_with_zero_cap_is_empty() {
        let index = two_doc_index();
        let round = FeedbackRound::collect(
            &index,
            &ranked(&[0, 1]),
            &tokens(&["b"]),
            "content",
            0,
            0.5,
        )
        .unwrap();

        assert!(round.is_empty());
        assert_eq!(round.num_terms(), 0);
        // Collection-level statistics are still available.
        assert_eq!(round.vocabulary_size(), 7);
    }
}
