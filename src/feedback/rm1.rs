//! RM1 relevance-model estimation.

use std::cmp::Ordering;

use crate::feedback::WordProbability;
use crate::feedback::language_model::SmoothedLanguageModel;
use crate::feedback::round::FeedbackRound;

/// Estimate the unnormalized relevance model over the round's candidate
/// vocabulary.
///
/// For every distinct term seen in the feedback documents:
///
/// ```text
/// P(t|R) = sum over feedback docs d of smoothedMLE(t, d) * queryLikelihood(d)
/// ```
///
/// The result is sorted descending by weight; the relative order of terms
/// with exactly equal weights is unspecified. Weights are left unnormalized,
/// ready for variant-specific selection and normalization.
pub fn estimate(round: &FeedbackRound) -> Vec<WordProbability> {
    let model = SmoothedLanguageModel::new(round);

    let mut words: Vec<WordProbability> = round
        .term_stats()
        .map(|stat| {
            let weight: f64 = round
                .docs()
                .iter()
                .map(|doc| model.smoothed_mle(&stat.term, &doc.vector) * doc.query_likelihood)
                .sum();
            WordProbability::new(stat.term.clone(), weight)
        })
        .collect();

    sort_by_ranking_desc(&mut words);
    words
}

/// Sort descending by ranking weight, leaving ties in their current order.
pub(crate) fn sort_by_ranking_desc(words: &mut [WordProbability]) {
    words.sort_by(|a, b| {
        b.ranking_weight
            .partial_cmp(&a.ranking_weight)
            .unwrap_or(Ordering::Equal)
    });
}
