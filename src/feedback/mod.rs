//! Pseudo-relevance feedback query expansion.
//!
//! Given the top-ranked documents from an initial retrieval pass, this module
//! estimates which vocabulary terms signal relevance, selects a bounded set
//! of expansion terms, and builds a reweighted disjunctive query for a second
//! pass. The estimators are the relevance model RM1, its query-interpolated
//! form RM3, and three RM3 variants that inject inverse document frequency at
//! different stages to prefer discriminative expansion terms.
//!
//! The flow per query:
//!
//! ```text
//! initial retrieval → FeedbackRound (statistics) → RM3 weighting
//!                   → expansion query → final retrieval
//! ```
//!
//! [`pipeline::RetrievalPipeline`] drives that sequence; everything else here
//! is a pure computation over a [`round::FeedbackRound`].

pub mod expansion;
pub mod language_model;
pub mod pipeline;
pub mod rm1;
pub mod rm3;
pub mod round;

pub use expansion::ExpansionQueryBuilder;
pub use language_model::{SmoothedLanguageModel, query_mle};
pub use pipeline::{QueryOutcome, RankedDocument, RetrievalPipeline};
pub use rm3::RmVariant;
pub use round::{FeedbackDocument, FeedbackRound};

use serde::{Deserialize, Serialize};

/// A term's estimated relevance weight, carried on two channels.
///
/// `ranking_weight` decides which terms survive selection and in what order;
/// `expansion_weight` is the boost the term contributes to the expanded
/// query. RM3, RM3-IDF1, and RM3-IDF2 keep the channels numerically equal at
/// every step; RM3-IDF3 lets them diverge so IDF can steer selection without
/// inflating the emitted weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordProbability {
    /// The term text.
    pub term: String,
    /// Weight used for selection and sort order.
    pub ranking_weight: f64,
    /// Weight emitted as the query boost.
    pub expansion_weight: f64,
}

impl WordProbability {
    /// Create a word probability with both channels set to `weight`.
    pub fn new<S: Into<String>>(term: S, weight: f64) -> Self {
        WordProbability {
            term: term.into(),
            ranking_weight: weight,
            expansion_weight: weight,
        }
    }
}
