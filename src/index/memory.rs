//! In-memory inverted index with stored document vectors.
//!
//! This backend keeps postings, per-document term vectors, and collection
//! statistics for every indexed field, which is exactly the surface the
//! feedback machinery needs: ranked retrieval plus cheap access to term
//! frequencies inside the top-ranked documents.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::analysis::analyzer::Analyzer;
use crate::error::Result;
use crate::index::searcher::SearchIndex;
use crate::index::types::{DocumentVector, ScoredDoc, TermStatistics, TopDocs};
use crate::query::{BooleanQuery, Occur};
use crate::search::similarity::{ScoreParams, Similarity};

/// One posting: a document and the term's frequency in it.
#[derive(Debug, Clone, Copy)]
struct Posting {
    doc_id: u64,
    term_freq: u64,
}

/// Postings and collection frequency for one term.
#[derive(Debug, Clone, Default)]
struct PostingList {
    collection_freq: u64,
    postings: Vec<Posting>,
}

/// Per-field postings, document vectors, and token counts.
#[derive(Debug, Clone, Default)]
struct FieldIndex {
    postings: AHashMap<String, PostingList>,
    vectors: AHashMap<u64, DocumentVector>,
    total_tokens: u64,
}

impl FieldIndex {
    fn avg_doc_length(&self) -> f64 {
        if self.vectors.is_empty() {
            0.0
        } else {
            self.total_tokens as f64 / self.vectors.len() as f64
        }
    }
}

/// An in-memory searchable index.
///
/// Documents are analyzed on insertion with the analyzer the index was built
/// with; queries must be analyzed with the same analyzer for terms to match.
pub struct MemoryIndex {
    analyzer: Arc<dyn Analyzer>,
    similarity: Similarity,
    external_ids: Vec<String>,
    fields: AHashMap<String, FieldIndex>,
}

impl MemoryIndex {
    /// Create an empty index that analyzes documents with `analyzer`.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        MemoryIndex {
            analyzer,
            similarity: Similarity::default(),
            external_ids: Vec::new(),
            fields: AHashMap::new(),
        }
    }

    /// Set the similarity function used to score searches.
    pub fn with_similarity(mut self, similarity: Similarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// Get the similarity function used to score searches.
    pub fn similarity(&self) -> Similarity {
        self.similarity
    }

    /// Add a document, returning its internal doc ID.
    ///
    /// `fields` pairs field names with raw text; each text is analyzed and
    /// indexed independently. Doc IDs are assigned in insertion order.
    pub fn add_document<S: Into<String>>(
        &mut self,
        external_id: S,
        fields: &[(&str, &str)],
    ) -> Result<u64> {
        let doc_id = self.external_ids.len() as u64;
        self.external_ids.push(external_id.into());

        for (field, text) in fields {
            let tokens = self.analyzer.analyze(text)?;
            let mut vector = DocumentVector::new();
            for token in tokens {
                vector.push(token.text);
            }
            if vector.is_empty() {
                continue;
            }

            let field_index = self.fields.entry((*field).to_string()).or_default();
            for (term, freq) in vector.iter() {
                let list = field_index.postings.entry(term.to_string()).or_default();
                list.collection_freq += freq;
                list.postings.push(Posting {
                    doc_id,
                    term_freq: freq,
                });
            }
            field_index.total_tokens += vector.length();
            field_index.vectors.insert(doc_id, vector);
        }

        Ok(doc_id)
    }

    /// Look up the internal doc ID for an external document name.
    pub fn doc_id(&self, external_id: &str) -> Option<u64> {
        self.external_ids
            .iter()
            .position(|id| id == external_id)
            .map(|pos| pos as u64)
    }

    /// Get the analyzer this index was built with.
    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    fn field(&self, field: &str) -> Option<&FieldIndex> {
        self.fields.get(field)
    }
}

impl SearchIndex for MemoryIndex {
    fn doc_count(&self) -> u64 {
        self.external_ids.len() as u64
    }

    fn vocabulary_size(&self, field: &str) -> Result<u64> {
        Ok(self.field(field).map(|f| f.total_tokens).unwrap_or(0))
    }

    fn term_statistics(&self, field: &str, term: &str) -> Result<Option<TermStatistics>> {
        let Some(field_index) = self.field(field) else {
            return Ok(None);
        };

        Ok(field_index.postings.get(term).map(|list| {
            TermStatistics::new(term, list.postings.len() as u64, list.collection_freq)
        }))
    }

    fn document_vector(&self, doc_id: u64, field: &str) -> Result<Option<DocumentVector>> {
        let Some(field_index) = self.field(field) else {
            return Ok(None);
        };

        Ok(field_index.vectors.get(&doc_id).cloned())
    }

    fn external_id(&self, doc_id: u64) -> Result<Option<String>> {
        Ok(self.external_ids.get(doc_id as usize).cloned())
    }

    fn search(&self, query: &BooleanQuery, top_k: usize) -> Result<TopDocs> {
        if query.is_empty() || top_k == 0 {
            return Ok(TopDocs::empty());
        }

        let doc_count = self.doc_count() as f64;
        let mut scores: AHashMap<u64, f64> = AHashMap::new();
        let mut must_matches: AHashMap<u64, usize> = AHashMap::new();
        let mut excluded: AHashSet<u64> = AHashSet::new();
        let mut must_clauses = 0usize;

        for clause in query.clauses() {
            let term_query = &clause.query;
            let Some(field_index) = self.field(term_query.field()) else {
                if clause.occur == Occur::Must {
                    // An unindexed field can never satisfy a MUST clause.
                    return Ok(TopDocs::empty());
                }
                continue;
            };

            let list = field_index.postings.get(term_query.term());

            match clause.occur {
                Occur::MustNot => {
                    if let Some(list) = list {
                        for posting in &list.postings {
                            excluded.insert(posting.doc_id);
                        }
                    }
                }
                Occur::Must | Occur::Should => {
                    if clause.occur == Occur::Must {
                        must_clauses += 1;
                    }
                    let Some(list) = list else {
                        if clause.occur == Occur::Must {
                            return Ok(TopDocs::empty());
                        }
                        continue;
                    };

                    let doc_freq = list.postings.len() as f64;
                    let collection_freq = list.collection_freq as f64;
                    let avg_doc_length = field_index.avg_doc_length();
                    let total_tokens = field_index.total_tokens as f64;
                    let boost = term_query.boost() as f64;

                    for posting in &list.postings {
                        let doc_length = field_index
                            .vectors
                            .get(&posting.doc_id)
                            .map(|v| v.length() as f64)
                            .unwrap_or(0.0);
                        let params = ScoreParams {
                            term_freq: posting.term_freq as f64,
                            doc_length,
                            doc_freq,
                            collection_freq,
                            doc_count,
                            avg_doc_length,
                            total_tokens,
                        };
                        *scores.entry(posting.doc_id).or_insert(0.0) +=
                            boost * self.similarity.score(&params);
                        if clause.occur == Occur::Must {
                            *must_matches.entry(posting.doc_id).or_insert(0) += 1;
                        }
                    }
                }
            }
        }

        let mut hits: Vec<ScoredDoc> = scores
            .into_iter()
            .filter(|(doc_id, _)| !excluded.contains(doc_id))
            .filter(|(doc_id, _)| {
                must_clauses == 0
                    || must_matches.get(doc_id).copied().unwrap_or(0) == must_clauses
            })
            .map(|(doc_id, score)| ScoredDoc::new(doc_id, score as f32))
            .collect();

        // Score descending, then doc ID ascending for a stable ranking.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });

        let total_hits = hits.len() as u64;
        hits.truncate(top_k);

        Ok(TopDocs::new(hits, total_hits))
    }
}

impl std::fmt::Debug for MemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIndex")
            .field("doc_count", &self.doc_count())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("similarity", &self.similarity)
            .finish()
    }
}

/// Build an index from `(external_id, content)` pairs, indexing everything
/// under a single field.
pub fn index_from_pairs<I, S, T>(
    analyzer: Arc<dyn Analyzer>,
    similarity: Similarity,
    field: &str,
    docs: I,
) -> Result<MemoryIndex>
where
    I: IntoIterator<Item = (S, T)>,
    S: Into<String>,
    T: AsRef<str>,
{
    let mut index = MemoryIndex::new(analyzer).with_similarity(similarity);
    for (external_id, text) in docs {
        index.add_document(external_id, &[(field, text.as_ref())])?;
    }
    Ok(index)
}

/// Convenience alias used where trait objects are shared across threads.
pub type SharedIndex = Arc<dyn SearchIndex>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::StandardAnalyzer;
    use crate::query::TermQuery;

    fn test_index() -> MemoryIndex {
        let analyzer = Arc::new(StandardAnalyzer::without_stop_words().unwrap());
        let mut index = MemoryIndex::new(analyzer).with_similarity(Similarity::bm25());
        index
            .add_document("doc1", &[("content", "oil spill cleanup crews")])
            .unwrap();
        index
            .add_document("doc2", &[("content", "oil oil tanker accident")])
            .unwrap();
        index
            .add_document("doc3", &[("content", "cooking with olive oil")])
            .unwrap();
        index
            .add_document("doc4", &[("content", "election night coverage")])
            .unwrap();
        index
    }

    #[test]
    fn test_doc_count_and_external_ids() {
        let index = test_index();
        assert_eq!(index.doc_count(), 4);
        assert_eq!(index.external_id(0).unwrap().as_deref(), Some("doc1"));
        assert_eq!(index.external_id(3).unwrap().as_deref(), Some("doc4"));
        assert_eq!(index.external_id(99).unwrap(), None);
        assert_eq!(index.doc_id("doc2"), Some(1));
        assert_eq!(index.doc_id("missing"), None);
    }

    #[test]
    fn test_term_statistics() {
        let index = test_index();
        let stats = index.term_statistics("content", "oil").unwrap().unwrap();
        assert_eq!(stats.doc_freq, 3);
        assert_eq!(stats.collection_freq, 4);

        assert!(index.term_statistics("content", "zebra").unwrap().is_none());
        assert!(index.term_statistics("title", "oil").unwrap().is_none());
    }

    #[test]
    fn test_vocabulary_size() {
        let index = test_index();
        // 4 + 4 + 4 + 3 tokens
        assert_eq!(index.vocabulary_size("content").unwrap(), 15);
        assert_eq!(index.vocabulary_size("missing").unwrap(), 0);
    }

    #[test]
    fn test_document_vector() {
        let index = test_index();
        let vector = index.document_vector(1, "content").unwrap().unwrap();
        assert_eq!(vector.term_freq("oil"), 2);
        assert_eq!(vector.length(), 4);

        assert!(index.document_vector(1, "title").unwrap().is_none());
    }

    #[test]
    fn test_search_ranks_by_term_frequency() {
        let index = test_index();
        let mut query = BooleanQuery::new();
        query.add_should(TermQuery::new("content", "oil"));

        let results = index.search(&query, 10).unwrap();
        assert_eq!(results.total_hits, 3);
        // doc2 has "oil" twice; the others once with equal lengths.
        assert_eq!(results.score_docs[0].doc_id, 1);
    }

    #[test]
    fn test_search_top_k_truncation() {
        let index = test_index();
        let mut query = BooleanQuery::new();
        query.add_should(TermQuery::new("content", "oil"));

        let results = index.search(&query, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.total_hits, 3);
    }

    #[test]
    fn test_search_must_not_excludes() {
        let index = test_index();
        let mut query = BooleanQuery::new();
        query.add_should(TermQuery::new("content", "oil"));
        query.add_must_not(TermQuery::new("content", "cooking"));

        let results = index.search(&query, 10).unwrap();
        let ids: Vec<u64> = results.score_docs.iter().map(|d| d.doc_id).collect();
        assert!(!ids.contains(&2));
        assert_eq!(results.total_hits, 2);
    }

    #[test]
    fn test_search_must_requires_all() {
        let index = test_index();
        let mut query = BooleanQuery::new();
        query.add_must(TermQuery::new("content", "oil"));
        query.add_must(TermQuery::new("content", "tanker"));

        let results = index.search(&query, 10).unwrap();
        assert_eq!(results.total_hits, 1);
        assert_eq!(results.score_docs[0].doc_id, 1);
    }

    #[test]
    fn test_search_missing_must_term_matches_nothing() {
        let index = test_index();
        let mut query = BooleanQuery::new();
        query.add_must(TermQuery::new("content", "zebra"));

        let results = index.search(&query, 10).unwrap();
        assert!(results.is_empty());
        assert_eq!(results.total_hits, 0);
    }

    #[test]
    fn test_search_empty_query() {
        let index = test_index();
        let query = BooleanQuery::new();
        assert!(index.search(&query, 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_boost_scales_scores() {
        let index = test_index();

        let mut plain = BooleanQuery::new();
        plain.add_should(TermQuery::new("content", "tanker"));
        let base = index.search(&plain, 10).unwrap().score_docs[0].score;

        let mut boosted = BooleanQuery::new();
        boosted.add_should(TermQuery::new("content", "tanker").with_boost(2.0));
        let doubled = index.search(&boosted, 10).unwrap().score_docs[0].score;

        assert!((doubled - 2.0 * base).abs() < 1e-6);
    }

    #[test]
    fn test_search_tie_breaks_by_doc_id() {
        let analyzer = Arc::new(StandardAnalyzer::without_stop_words().unwrap());
        let mut index = MemoryIndex::new(analyzer).with_similarity(Similarity::bm25());
        // Identical documents score identically.
        index.add_document("a", &[("content", "same text")]).unwrap();
        index.add_document("b", &[("content", "same text")]).unwrap();
        index.add_document("c", &[("content", "same text")]).unwrap();

        let mut query = BooleanQuery::new();
        query.add_should(TermQuery::new("content", "same"));

        let results = index.search(&query, 10).unwrap();
        let ids: Vec<u64> = results.score_docs.iter().map(|d| d.doc_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_index_from_pairs() {
        let analyzer = Arc::new(StandardAnalyzer::without_stop_words().unwrap());
        let index = index_from_pairs(
            analyzer,
            Similarity::bm25(),
            "content",
            vec![("d1", "alpha beta"), ("d2", "beta gamma")],
        )
        .unwrap();

        assert_eq!(index.doc_count(), 2);
        let stats = index.term_statistics("content", "beta").unwrap().unwrap();
        assert_eq!(stats.doc_freq, 2);
    }
}
