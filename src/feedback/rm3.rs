//! RM3 weighting and its IDF-aware variants.
//!
//! All variants start from the unnormalized RM1 estimate and differ only in
//! where inverse document frequency enters, if at all:
//!
//! - [`RmVariant::Rm3`]: truncate, normalize, interpolate with the query
//!   model. No IDF.
//! - [`RmVariant::Rm3Idf1`]: multiply every RM1 weight by IDF *before*
//!   selection, then proceed as RM3. Rare terms rise into the selected set
//!   and their emitted weights stay IDF-scaled.
//! - [`RmVariant::Rm3Idf2`]: interpolate first over a coarse candidate pool,
//!   multiply by IDF *after* the query model is mixed in, then select and
//!   renormalize.
//! - [`RmVariant::Rm3Idf3`]: let IDF decide *which* terms are kept while the
//!   emitted weights keep the plain RM3 scale. The two weight channels of
//!   [`WordProbability`] diverge only here.
//!
//! IDF is `ln(N / (df + 1))` over the collaborating index. Terms that never
//! occurred in the feedback documents have no cached statistics; wherever a
//! variant multiplies such a term (a query token, usually), the weight is
//! left unchanged.

use std::cmp::Ordering;
use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::config::FeedbackConfig;
use crate::feedback::WordProbability;
use crate::feedback::language_model::query_mle;
use crate::feedback::rm1;
use crate::feedback::round::FeedbackRound;

/// How far past `num_feedback_terms` the post-selection IDF variants look
/// before re-sorting: the candidate pool is `num_feedback_terms *
/// COARSE_PRUNE_FACTOR` terms deep.
pub const COARSE_PRUNE_FACTOR: usize = 20;

/// The relevance-model weighting variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RmVariant {
    /// Plain RM3 interpolation.
    Rm3,
    /// IDF reweighting before term selection.
    Rm3Idf1,
    /// IDF reweighting after query-model mixing.
    Rm3Idf2,
    /// IDF-driven selection with RM3-scale output weights.
    Rm3Idf3,
}

impl RmVariant {
    /// Short tag used in run names and log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            RmVariant::Rm3 => "rm3",
            RmVariant::Rm3Idf1 => "rm3-idf1",
            RmVariant::Rm3Idf2 => "rm3-idf2",
            RmVariant::Rm3Idf3 => "rm3-idf3",
        }
    }
}

impl Default for RmVariant {
    fn default() -> Self {
        RmVariant::Rm3Idf3
    }
}

impl fmt::Display for RmVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Run the selected variant over a collected feedback round.
///
/// Returns the expanded query model: every entry carries the weight used for
/// selection (`ranking_weight`) and the weight to emit as a query boost
/// (`expansion_weight`). The expansion weights sum to one whenever the result
/// is non-empty, and the list is sorted descending by expansion weight with
/// ties left in unspecified order.
///
/// An empty round degrades to the query model itself: the analyzed query
/// tokens come back weighted by their maximum-likelihood estimates.
pub fn expand(
    variant: RmVariant,
    round: &FeedbackRound,
    query_tokens: &[String],
    config: &FeedbackConfig,
) -> Vec<WordProbability> {
    let rm1 = rm1::estimate(round);
    let mut words = match variant {
        RmVariant::Rm3 => rm3(rm1, query_tokens, config),
        RmVariant::Rm3Idf1 => rm3_idf1(rm1, round, query_tokens, config),
        RmVariant::Rm3Idf2 => rm3_idf2(rm1, round, query_tokens, config),
        RmVariant::Rm3Idf3 => rm3_idf3(rm1, round, query_tokens, config),
    };
    sort_by_expansion_desc(&mut words);
    words
}

/// Truncate to `num_feedback_terms`, normalize, mix in the query model.
fn rm3(
    mut rm1: Vec<WordProbability>,
    query_tokens: &[String],
    config: &FeedbackConfig,
) -> Vec<WordProbability> {
    rm1.truncate(config.num_feedback_terms);
    normalize(&mut rm1);
    mix_query_model(rm1, query_tokens, config.query_mix)
}

/// Reweight by IDF first, so selection already favors rare terms, then run
/// the plain RM3 steps on the reordered list.
fn rm3_idf1(
    mut rm1: Vec<WordProbability>,
    round: &FeedbackRound,
    query_tokens: &[String],
    config: &FeedbackConfig,
) -> Vec<WordProbability> {
    scale_by_idf(&mut rm1, round);
    rm1::sort_by_ranking_desc(&mut rm1);
    rm1.truncate(config.num_feedback_terms);
    normalize(&mut rm1);
    mix_query_model(rm1, query_tokens, config.query_mix)
}

/// Mix the query model into a coarse candidate pool first, reweight the
/// mixed distribution by IDF, then select and renormalize.
fn rm3_idf2(
    mut rm1: Vec<WordProbability>,
    round: &FeedbackRound,
    query_tokens: &[String],
    config: &FeedbackConfig,
) -> Vec<WordProbability> {
    rm1.truncate(config.num_feedback_terms.saturating_mul(COARSE_PRUNE_FACTOR));
    normalize(&mut rm1);
    let mut words = mix_query_model(rm1, query_tokens, config.query_mix);
    scale_by_idf(&mut words, round);
    rm1::sort_by_ranking_desc(&mut words);
    words.truncate(config.num_feedback_terms);
    normalize(&mut words);
    words
}

/// IDF decides which terms survive, but the emitted weights keep the plain
/// RM3 scale: the ranking channel carries the IDF-scaled copy while the
/// expansion channel is normalized and query-mixed on its own.
fn rm3_idf3(
    mut rm1: Vec<WordProbability>,
    round: &FeedbackRound,
    query_tokens: &[String],
    config: &FeedbackConfig,
) -> Vec<WordProbability> {
    rm1.truncate(config.num_feedback_terms.saturating_mul(COARSE_PRUNE_FACTOR));
    normalize(&mut rm1);

    // The channels diverge here: only the ranking weight picks up IDF.
    for word in rm1.iter_mut() {
        if let Some(idf) = idf(round, &word.term) {
            word.ranking_weight *= idf;
        }
    }
    rm1::sort_by_ranking_desc(&mut rm1);
    rm1.truncate(config.num_feedback_terms);
    normalize_expansion(&mut rm1);

    // Query mixing touches only the emitted channel; the ranking weights of
    // surviving terms stay IDF-scaled.
    for word in rm1.iter_mut() {
        word.expansion_weight = (1.0 - config.query_mix) * word.expansion_weight
            + config.query_mix * query_mle(&word.term, query_tokens);
    }
    let added = missing_query_words(&rm1, query_tokens, config.query_mix);
    rm1.extend(added);
    normalize_expansion(&mut rm1);
    rm1
}

/// `ln(N / (df + 1))` for a term with cached statistics.
fn idf(round: &FeedbackRound, term: &str) -> Option<f64> {
    round
        .term_stat(term)
        .map(|stat| (round.doc_count() as f64 / (stat.doc_freq as f64 + 1.0)).ln())
}

/// Multiply both channels by IDF. Terms without cached statistics keep
/// their weights unchanged.
fn scale_by_idf(words: &mut [WordProbability], round: &FeedbackRound) {
    for word in words.iter_mut() {
        if let Some(idf) = idf(round, &word.term) {
            word.ranking_weight *= idf;
            word.expansion_weight = word.ranking_weight;
        }
    }
}

/// Interpolate a normalized feedback model with the query model over the
/// union of both vocabularies, then renormalize:
///
/// ```text
/// P'(t) = (1 - query_mix) * P(t) + query_mix * MLE(t|Q)
/// ```
fn mix_query_model(
    mut words: Vec<WordProbability>,
    query_tokens: &[String],
    query_mix: f64,
) -> Vec<WordProbability> {
    for word in words.iter_mut() {
        let mixed = (1.0 - query_mix) * word.ranking_weight
            + query_mix * query_mle(&word.term, query_tokens);
        word.ranking_weight = mixed;
        word.expansion_weight = mixed;
    }
    let added = missing_query_words(&words, query_tokens, query_mix);
    words.extend(added);
    normalize(&mut words);
    words
}

/// Query tokens absent from `words`, deduplicated in first-occurrence order,
/// each entering with `query_mix * MLE(t|Q)` on both channels.
fn missing_query_words(
    words: &[WordProbability],
    query_tokens: &[String],
    query_mix: f64,
) -> Vec<WordProbability> {
    let present: AHashSet<&str> = words.iter().map(|w| w.term.as_str()).collect();
    let mut seen: AHashSet<&str> = AHashSet::new();
    let mut added = Vec::new();
    for token in query_tokens {
        if present.contains(token.as_str()) || !seen.insert(token.as_str()) {
            continue;
        }
        added.push(WordProbability::new(
            token.clone(),
            query_mix * query_mle(token, query_tokens),
        ));
    }
    added
}

/// Scale both channels so the ranking weights sum to one. A non-positive
/// sum leaves the weights untouched.
fn normalize(words: &mut [WordProbability]) {
    let sum: f64 = words.iter().map(|w| w.ranking_weight).sum();
    if sum > 0.0 {
        for word in words.iter_mut() {
            word.ranking_weight /= sum;
            word.expansion_weight /= sum;
        }
    }
}

/// Scale only the expansion channel so it sums to one.
fn normalize_expansion(words: &mut [WordProbability]) {
    let sum: f64 = words.iter().map(|w| w.expansion_weight).sum();
    if sum > 0.0 {
        for word in words.iter_mut() {
            word.expansion_weight /= sum;
        }
    }
}

fn sort_by_expansion_desc(words: &mut [WordProbability]) {
    words.sort_by(|a, b| {
        b.expansion_weight
            .partial_cmp(&a.expansion_weight)
            .unwrap_or(Ordering::Equal)
    });
}
