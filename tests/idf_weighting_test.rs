//! Integration tests separating IDF's selection role from its weighting role.

use std::sync::Arc;

use pilum::analysis::StandardAnalyzer;
use pilum::config::{FeedbackConfig, PipelineConfig};
use pilum::error::Result;
use pilum::feedback::{RetrievalPipeline, RmVariant, WordProbability};
use pilum::index::{DocumentVector, MemoryIndex, SearchIndex, TermStatistics, TopDocs};
use pilum::query::BooleanQuery;

/// Index wrapper that rescales every document frequency by a constant factor,
/// leaving all other statistics untouched. Rescaling is monotone: relative
/// order of document frequencies is preserved.
#[derive(Debug)]
struct DfScaledIndex {
    inner: MemoryIndex,
    factor: u64,
}

impl SearchIndex for DfScaledIndex {
    fn doc_count(&self) -> u64 {
        self.inner.doc_count()
    }

    fn vocabulary_size(&self, field: &str) -> Result<u64> {
        self.inner.vocabulary_size(field)
    }

    fn term_statistics(&self, field: &str, term: &str) -> Result<Option<TermStatistics>> {
        Ok(self.inner.term_statistics(field, term)?.map(|stats| {
            TermStatistics::new(
                stats.term,
                stats.doc_freq * self.factor,
                stats.collection_freq,
            )
        }))
    }

    fn document_vector(&self, doc_id: u64, field: &str) -> Result<Option<DocumentVector>> {
        self.inner.document_vector(doc_id, field)
    }

    fn external_id(&self, doc_id: u64) -> Result<Option<String>> {
        self.inner.external_id(doc_id)
    }

    fn search(&self, query: &BooleanQuery, top_k: usize) -> Result<TopDocs> {
        self.inner.search(query, top_k)
    }
}

/// A 20-document corpus where the query "spill" hits exactly two documents.
/// The candidate expansion terms have distinct, well-separated statistics:
/// df(spill)=2, df(oil)=2, df(exxon)=3, df(valdez)=6.
fn spill_corpus(analyzer: &Arc<StandardAnalyzer>) -> MemoryIndex {
    let mut index = MemoryIndex::new(analyzer.clone());
    let docs = [
        "spill oil exxon exxon exxon",
        "spill oil oil exxon valdez",
        "exxon pipeline upkeep",
        "valdez coast guard",
        "valdez cleanup crew",
        "valdez alaska shore",
        "valdez winter storm",
        "valdez port authority",
        "quiet harbor town",
        "fishing boats dock",
        "morning market trade",
        "evening ferry crossing",
        "lighthouse keeper watch",
        "northern railway bridge",
        "summer tourist season",
        "cannery worker shift",
        "mountain weather station",
        "river salmon run",
        "timber mill yard",
        "island mail route",
    ];
    for (i, text) in docs.iter().enumerate() {
        index
            .add_document(format!("DOC-{i}"), &[("content", text)])
            .unwrap();
    }
    index
}

fn expansion_for(factor: u64, variant: RmVariant) -> Vec<WordProbability> {
    let analyzer = Arc::new(StandardAnalyzer::without_stop_words().unwrap());
    let index = DfScaledIndex {
        inner: spill_corpus(&analyzer),
        factor,
    };

    let config = PipelineConfig::default()
        .with_variant(variant)
        .with_feedback(FeedbackConfig::default().with_num_feedback_terms(2));
    let pipeline = RetrievalPipeline::new(Arc::new(index), analyzer, config).unwrap();

    pipeline.run("301", "spill").unwrap().expansion
}

fn weight_of(expansion: &[WordProbability], term: &str) -> f64 {
    expansion
        .iter()
        .find(|w| w.term == term)
        .map(|w| w.expansion_weight)
        .unwrap_or_else(|| panic!("term {term} missing from expansion"))
}

#[test]
fn test_idf3_weights_unchanged_by_df_rescaling() {
    // Under the discriminative-selection variant, IDF decides which terms
    // survive; their expansion weights come from the vanilla language-model
    // channel. Tripling every df changes every IDF value (and reorders the
    // ranking channel) but here keeps the selected set intact, so every
    // expansion weight must be bit-for-bit unaffected.
    let plain = expansion_for(1, RmVariant::Rm3Idf3);
    let rescaled = expansion_for(3, RmVariant::Rm3Idf3);

    let mut plain_terms: Vec<&str> = plain.iter().map(|w| w.term.as_str()).collect();
    let mut rescaled_terms: Vec<&str> = rescaled.iter().map(|w| w.term.as_str()).collect();
    plain_terms.sort_unstable();
    rescaled_terms.sort_unstable();
    assert_eq!(plain_terms, rescaled_terms);

    for word in &plain {
        let other = weight_of(&rescaled, &word.term);
        assert!(
            (word.expansion_weight - other).abs() < 1e-12,
            "{} drifted: {} vs {}",
            word.term,
            word.expansion_weight,
            other
        );
    }

    // The selected terms and the re-injected query token carry the expected
    // language-model magnitudes.
    assert!((weight_of(&plain, "spill") - 0.5).abs() < 1e-9);
    assert!((weight_of(&plain, "exxon") - 0.286859).abs() < 1e-5);
    assert!((weight_of(&plain, "oil") - 0.213141).abs() < 1e-5);

    let sum: f64 = plain.iter().map(|w| w.expansion_weight).sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn test_idf2_weights_shift_under_df_rescaling() {
    // The contrast case: RM3-IDF2 multiplies final weights by IDF, so
    // changing IDF magnitudes reshapes the distribution itself.
    let plain = expansion_for(1, RmVariant::Rm3Idf2);
    let rescaled = expansion_for(3, RmVariant::Rm3Idf2);

    let plain_sum: f64 = plain.iter().map(|w| w.expansion_weight).sum();
    let rescaled_sum: f64 = rescaled.iter().map(|w| w.expansion_weight).sum();
    assert!((plain_sum - 1.0).abs() < 1e-9);
    assert!((rescaled_sum - 1.0).abs() < 1e-9);

    // The query token survives selection in both runs, with visibly
    // different mass.
    let drift = (weight_of(&plain, "spill") - weight_of(&rescaled, "spill")).abs();
    assert!(drift > 1e-3, "expected df rescaling to move weights, drift {drift}");
}
