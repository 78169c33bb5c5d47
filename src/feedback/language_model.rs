//! Smoothed language-model probabilities over a feedback round.

use crate::feedback::round::FeedbackRound;
use crate::index::types::DocumentVector;

/// Smoothed maximum-likelihood term probabilities for (term, document) pairs.
///
/// Probabilities interpolate the within-document estimate with the collection
/// estimate using the round's mixing lambda:
///
/// ```text
/// smoothedMLE(t, d) = lambda * tf(t,d)/|d| + (1 - lambda) * cf(t)/V
/// ```
///
/// A term with no cached corpus statistic in the round evaluates to 1.0, not
/// 0.0. Query-likelihood products therefore pass through unchanged for terms
/// the feedback set never saw; downstream weighting relies on this exact
/// behavior.
#[derive(Debug, Clone, Copy)]
pub struct SmoothedLanguageModel<'a> {
    round: &'a FeedbackRound,
}

impl<'a> SmoothedLanguageModel<'a> {
    /// Create a model over the given round's statistics.
    pub fn new(round: &'a FeedbackRound) -> Self {
        SmoothedLanguageModel { round }
    }

    /// Smoothed probability of `term` under `vector`'s document model.
    pub fn smoothed_mle(&self, term: &str, vector: &DocumentVector) -> f64 {
        let Some(stat) = self.round.term_stat(term) else {
            // No cached corpus statistic: 1.0, not 0.0.
            return 1.0;
        };

        let lambda = self.round.mixing_lambda();

        let doc_part = if vector.length() == 0 {
            0.0
        } else {
            vector.term_freq(term) as f64 / vector.length() as f64
        };

        let vocabulary_size = self.round.vocabulary_size();
        let collection_part = if vocabulary_size == 0 {
            0.0
        } else {
            stat.collection_freq as f64 / vocabulary_size as f64
        };

        lambda * doc_part + (1.0 - lambda) * collection_part
    }

    /// Likelihood of the query under `vector`'s document model: the product
    /// of smoothed per-token probabilities, assuming token independence.
    pub fn query_likelihood(&self, vector: &DocumentVector, query_tokens: &[String]) -> f64 {
        query_tokens
            .iter()
            .map(|token| self.smoothed_mle(token, vector))
            .product()
    }
}

/// Unsmoothed maximum-likelihood probability of `term` in the analyzed query:
/// its token count divided by the total token count. Zero for an empty query.
pub fn query_mle(term: &str, query_tokens: &[String]) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }

    let count = query_tokens.iter().filter(|t| t.as_str() == term).count();
    count as f64 / query_tokens.len() as f64
}
