//! The per-query retrieval pipeline.
//!
//! Each query runs the same strictly sequential stages:
//!
//! ```text
//! initial retrieval -> feedback collection -> weighting
//!     -> query expansion -> final retrieval -> emit
//! ```
//!
//! No stage is skipped. Data moves forward through return values only, so a
//! pipeline holds no per-query mutable state and one instance can serve any
//! number of queries, including concurrently from multiple threads. A query
//! with zero feedback documents still runs every stage: weighting degrades
//! to the query model and the final retrieval effectively reruns the
//! original query.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::config::PipelineConfig;
use crate::error::{PilumError, Result};
use crate::feedback::expansion::ExpansionQueryBuilder;
use crate::feedback::rm3;
use crate::feedback::round::FeedbackRound;
use crate::feedback::WordProbability;
use crate::index::searcher::SearchIndex;
use crate::index::types::TopDocs;
use crate::query::{BooleanQuery, TermQuery};

/// One document of the final ranking, with its external identifier resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedDocument {
    /// External document identifier (the `docno` of TREC collections).
    pub doc_name: String,
    /// Final retrieval score.
    pub score: f32,
}

/// Everything a finished query produced, ready for emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Query identifier (TREC topic number).
    pub query_id: String,
    /// Analyzed query tokens.
    pub tokens: Vec<String>,
    /// Number of documents the initial pass matched.
    pub initial_hit_count: u64,
    /// Number of feedback documents actually used.
    pub feedback_doc_count: usize,
    /// The expanded query model, sorted descending by expansion weight.
    pub expansion: Vec<WordProbability>,
    /// Human-readable form of the expanded query.
    pub expanded_query: String,
    /// Final ranking with external identifiers resolved.
    pub results: Vec<RankedDocument>,
}

/// Runs queries end to end against a search index.
pub struct RetrievalPipeline {
    index: Arc<dyn SearchIndex>,
    analyzer: Arc<dyn Analyzer>,
    builder: ExpansionQueryBuilder,
    config: PipelineConfig,
}

impl RetrievalPipeline {
    /// Create a pipeline over an index and the analyzer its documents were
    /// indexed with. The configuration is validated once here.
    pub fn new(
        index: Arc<dyn SearchIndex>,
        analyzer: Arc<dyn Analyzer>,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let builder = ExpansionQueryBuilder::new(config.search_field.clone())
            .with_max_clauses(config.max_expansion_clauses);
        Ok(RetrievalPipeline {
            index,
            analyzer,
            builder,
            config,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one query through all stages.
    ///
    /// Errors out of any stage abort the query: index failures, a missing
    /// external identifier in the final ranking, or an expanded query above
    /// the clause limit.
    pub fn run(&self, query_id: &str, query_text: &str) -> Result<QueryOutcome> {
        let tokens = self.analyze_query(query_text)?;

        let initial = self.initial_retrieval(&tokens)?;

        let round = FeedbackRound::collect(
            self.index.as_ref(),
            &initial,
            &tokens,
            &self.config.feedback_field,
            self.config.feedback.num_feedback_docs,
            self.config.feedback.mixing_lambda,
        )?;

        let expansion = rm3::expand(self.config.variant, &round, &tokens, &self.config.feedback);

        let expanded_query = self.builder.build(&expansion)?;

        let finals = self.index.search(&expanded_query, self.config.top_k_initial)?;

        let results = self.resolve(&finals)?;
        Ok(QueryOutcome {
            query_id: query_id.to_string(),
            tokens,
            initial_hit_count: initial.total_hits,
            feedback_doc_count: round.num_docs(),
            expansion,
            expanded_query: expanded_query.description(),
            results,
        })
    }

    /// Analyze the query text into search tokens.
    fn analyze_query(&self, query_text: &str) -> Result<Vec<String>> {
        let stream = self.analyzer.analyze(query_text)?;
        Ok(stream.map(|token| token.text).collect())
    }

    /// First pass: one SHOULD clause per analyzed token, unboosted.
    fn initial_retrieval(&self, tokens: &[String]) -> Result<TopDocs> {
        let mut query = BooleanQuery::new();
        for token in tokens {
            query.add_should(TermQuery::new(&self.config.search_field, token));
        }
        self.index.search(&query, self.config.top_k_initial)
    }

    /// Map internal document ids of the final ranking back to external ones.
    fn resolve(&self, hits: &TopDocs) -> Result<Vec<RankedDocument>> {
        hits.score_docs
            .iter()
            .map(|hit| {
                let doc_name = self.index.external_id(hit.doc_id)?.ok_or_else(|| {
                    PilumError::index(format!("document {} has no external id", hit.doc_id))
                })?;
                Ok(RankedDocument {
                    doc_name,
                    score: hit.score,
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for RetrievalPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalPipeline")
            .field("analyzer", &self.analyzer.name())
            .field("config", &self.config)
            .finish()
    }
}
