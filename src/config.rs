//! Configuration for feedback runs.
//!
//! [`FeedbackConfig`] holds the estimation parameters shared by every
//! relevance-model variant, [`PipelineConfig`] adds the retrieval-side
//! settings (fields, depths, ranking function). Both deserialize from JSON
//! with per-field defaults, so a config file only needs to name the values
//! it overrides:
//!
//! ```json
//! { "variant": "rm3-idf2", "feedback": { "num_feedback_terms": 20 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PilumError, Result};
use crate::feedback::RmVariant;
use crate::query::DEFAULT_MAX_CLAUSE_COUNT;
use crate::search::Similarity;

/// Parameters of the relevance-model estimation itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Number of top-ranked positions examined for feedback. Documents in
    /// that window without a stored term vector are skipped, so the kept
    /// set may fall short of this count.
    pub num_feedback_docs: usize,
    /// Number of expansion terms kept after weighting.
    pub num_feedback_terms: usize,
    /// Smoothing weight of the document model in the mixture
    /// `lambda * P(t|d) + (1 - lambda) * P(t|C)`.
    pub mixing_lambda: f64,
    /// Interpolation weight of the original query model when mixing it into
    /// the expanded model (`0.0` ignores the query, `1.0` ignores feedback).
    pub query_mix: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        FeedbackConfig {
            num_feedback_docs: 10,
            num_feedback_terms: 60,
            mixing_lambda: 0.8,
            query_mix: 0.5,
        }
    }
}

impl FeedbackConfig {
    /// Set the number of feedback documents.
    pub fn with_num_feedback_docs(mut self, n: usize) -> Self {
        self.num_feedback_docs = n;
        self
    }

    /// Set the number of expansion terms.
    pub fn with_num_feedback_terms(mut self, n: usize) -> Self {
        self.num_feedback_terms = n;
        self
    }

    /// Set the document-model smoothing weight.
    pub fn with_mixing_lambda(mut self, lambda: f64) -> Self {
        self.mixing_lambda = lambda;
        self
    }

    /// Set the query-model interpolation weight.
    pub fn with_query_mix(mut self, query_mix: f64) -> Self {
        self.query_mix = query_mix;
        self
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.mixing_lambda) {
            return Err(PilumError::invalid_config(format!(
                "mixing_lambda must be in [0, 1], got {}",
                self.mixing_lambda
            )));
        }
        if !(0.0..=1.0).contains(&self.query_mix) {
            return Err(PilumError::invalid_config(format!(
                "query_mix must be in [0, 1], got {}",
                self.query_mix
            )));
        }
        Ok(())
    }
}

/// Configuration for a full retrieval-plus-expansion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Field the initial and final queries search against.
    pub search_field: String,
    /// Field whose stored term vectors feed the relevance model.
    pub feedback_field: String,
    /// Result depth of both retrieval passes.
    pub top_k_initial: usize,
    /// Relevance-model variant used for weighting.
    pub variant: RmVariant,
    /// Ranking function for both retrieval passes.
    pub similarity: Similarity,
    /// Upper bound on the number of clauses in the expanded query.
    pub max_expansion_clauses: usize,
    /// Estimation parameters.
    pub feedback: FeedbackConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            search_field: "content".to_string(),
            feedback_field: "content".to_string(),
            top_k_initial: 1000,
            variant: RmVariant::default(),
            similarity: Similarity::default(),
            max_expansion_clauses: DEFAULT_MAX_CLAUSE_COUNT,
            feedback: FeedbackConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PilumError::invalid_config(format!(
                "failed to read config file '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        let config: PipelineConfig = serde_json::from_str(&content).map_err(|e| {
            PilumError::invalid_config(format!(
                "failed to parse config file '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Set the field both retrieval passes search.
    pub fn with_search_field(mut self, field: impl Into<String>) -> Self {
        self.search_field = field.into();
        self
    }

    /// Set the field feedback statistics are drawn from.
    pub fn with_feedback_field(mut self, field: impl Into<String>) -> Self {
        self.feedback_field = field.into();
        self
    }

    /// Set the result depth of both retrieval passes.
    pub fn with_top_k_initial(mut self, top_k: usize) -> Self {
        self.top_k_initial = top_k;
        self
    }

    /// Set the relevance-model variant.
    pub fn with_variant(mut self, variant: RmVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the ranking function.
    pub fn with_similarity(mut self, similarity: Similarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// Set the clause cap for expanded queries.
    pub fn with_max_expansion_clauses(mut self, max: usize) -> Self {
        self.max_expansion_clauses = max;
        self
    }

    /// Set the estimation parameters wholesale.
    pub fn with_feedback(mut self, feedback: FeedbackConfig) -> Self {
        self.feedback = feedback;
        self
    }

    /// Run tag for result files: encodes the ranking function, feedback
    /// depths, variant, query mix and fields, so a res file is traceable to
    /// the exact experiment that produced it.
    pub fn run_tag(&self) -> String {
        format!(
            "{}-D{}-T{}-{}-queryMix-{}-{}-{}",
            self.similarity.tag(),
            self.feedback.num_feedback_docs,
            self.feedback.num_feedback_terms,
            self.variant.tag(),
            self.feedback.query_mix,
            self.search_field,
            self.feedback_field
        )
    }

    /// Validate parameter ranges and field names.
    pub fn validate(&self) -> Result<()> {
        if self.search_field.is_empty() {
            return Err(PilumError::invalid_config("search_field cannot be empty"));
        }
        if self.feedback_field.is_empty() {
            return Err(PilumError::invalid_config("feedback_field cannot be empty"));
        }
        if self.top_k_initial == 0 {
            return Err(PilumError::invalid_config("top_k_initial must be positive"));
        }
        if self.max_expansion_clauses == 0 {
            return Err(PilumError::invalid_config(
                "max_expansion_clauses must be positive",
            ));
        }
        self.feedback.validate()
    }
}
