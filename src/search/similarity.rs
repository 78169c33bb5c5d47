//! Similarity functions for ranking documents against term queries.
//!
//! Each variant scores one term against one document from postings-level
//! statistics. Boolean queries sum the clause scores, scaled by clause
//! boosts, so expanded feedback queries rank documents by the weighted sum
//! of their expansion-term scores.

use serde::{Deserialize, Serialize};

/// Statistics needed to score one term occurrence against one document.
///
/// All values are `f64` so callers convert counts once, at the boundary.
#[derive(Debug, Clone, Copy)]
pub struct ScoreParams {
    /// Frequency of the term in the document.
    pub term_freq: f64,
    /// Length of the document field in tokens.
    pub doc_length: f64,
    /// Number of documents containing the term.
    pub doc_freq: f64,
    /// Total occurrences of the term in the collection.
    pub collection_freq: f64,
    /// Number of documents in the index.
    pub doc_count: f64,
    /// Average document field length in tokens.
    pub avg_doc_length: f64,
    /// Total token occurrences in the field across the collection.
    pub total_tokens: f64,
}

/// A pluggable document-scoring function.
///
/// The language-model variants need collection statistics (`collection_freq`,
/// `total_tokens`); the others work from document frequency alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Similarity {
    /// Classic TF-IDF with vector-space length normalization.
    Classic,
    /// Okapi BM25.
    Bm25 {
        /// Term-frequency saturation parameter.
        k1: f32,
        /// Length-normalization parameter.
        b: f32,
    },
    /// Language model with Jelinek-Mercer smoothing.
    LmJelinekMercer {
        /// Weight of the collection model in the mixture.
        lambda: f32,
    },
    /// Language model with Dirichlet-prior smoothing.
    LmDirichlet {
        /// Dirichlet pseudo-count parameter.
        mu: f32,
    },
    /// Divergence from randomness with the I(F) basic model, Bernoulli
    /// after-effect, and H2 length normalization.
    Dfr,
}

impl Similarity {
    /// BM25 with the conventional defaults.
    pub fn bm25() -> Self {
        Similarity::Bm25 { k1: 1.2, b: 0.75 }
    }

    /// Jelinek-Mercer language model with the given collection weight.
    pub fn lm_jelinek_mercer(lambda: f32) -> Self {
        Similarity::LmJelinekMercer { lambda }
    }

    /// Dirichlet language model with the given pseudo-count.
    pub fn lm_dirichlet(mu: f32) -> Self {
        Similarity::LmDirichlet { mu }
    }

    /// Score one term against one document.
    ///
    /// Returns 0.0 when the statistics cannot support the formula (zero
    /// document length, unseen term, empty collection); a missing term never
    /// contributes negatively to a document's score.
    pub fn score(&self, params: &ScoreParams) -> f64 {
        if params.term_freq <= 0.0 || params.doc_length <= 0.0 || params.doc_count <= 0.0 {
            return 0.0;
        }

        match *self {
            Similarity::Classic => Self::score_classic(params),
            Similarity::Bm25 { k1, b } => Self::score_bm25(params, k1 as f64, b as f64),
            Similarity::LmJelinekMercer { lambda } => {
                Self::score_lm_jelinek_mercer(params, lambda as f64)
            }
            Similarity::LmDirichlet { mu } => Self::score_lm_dirichlet(params, mu as f64),
            Similarity::Dfr => Self::score_dfr(params),
        }
    }

    /// Classic TF-IDF.
    ///
    /// score = sqrt(tf) * idf^2 / sqrt(dl), with idf = 1 + ln(N / (df + 1)).
    /// The idf appears squared because both the query weight and the document
    /// weight carry one factor of it.
    fn score_classic(params: &ScoreParams) -> f64 {
        let idf = 1.0 + (params.doc_count / (params.doc_freq + 1.0)).ln();
        let tf = params.term_freq.sqrt();
        let length_norm = 1.0 / params.doc_length.sqrt();

        tf * idf * idf * length_norm
    }

    /// Okapi BM25.
    ///
    /// idf = ln(1 + (N - df + 0.5) / (df + 0.5))
    /// score = idf * tf * (k1 + 1) / (tf + k1 * (1 - b + b * dl / avgdl))
    fn score_bm25(params: &ScoreParams, k1: f64, b: f64) -> f64 {
        if params.doc_freq <= 0.0 || params.avg_doc_length <= 0.0 {
            return 0.0;
        }

        let idf = (1.0
            + (params.doc_count - params.doc_freq + 0.5) / (params.doc_freq + 0.5))
            .ln();
        let norm = 1.0 - b + b * params.doc_length / params.avg_doc_length;
        let tf_component = params.term_freq * (k1 + 1.0) / (params.term_freq + k1 * norm);

        idf * tf_component
    }

    /// Language model with Jelinek-Mercer smoothing.
    ///
    /// score = ln(1 + ((1 - lambda) * tf / dl) / (lambda * cf / V))
    fn score_lm_jelinek_mercer(params: &ScoreParams, lambda: f64) -> f64 {
        if params.collection_freq <= 0.0 || params.total_tokens <= 0.0 || lambda <= 0.0 {
            return 0.0;
        }

        let collection_prob = params.collection_freq / params.total_tokens;
        let doc_prob = params.term_freq / params.doc_length;

        (1.0 + ((1.0 - lambda) * doc_prob) / (lambda * collection_prob)).ln()
    }

    /// Language model with Dirichlet-prior smoothing.
    ///
    /// score = ln(1 + tf / (mu * cf / V)) + ln(mu / (dl + mu)), floored at 0.
    fn score_lm_dirichlet(params: &ScoreParams, mu: f64) -> f64 {
        if params.collection_freq <= 0.0 || params.total_tokens <= 0.0 || mu <= 0.0 {
            return 0.0;
        }

        let collection_prob = params.collection_freq / params.total_tokens;
        let score = (1.0 + params.term_freq / (mu * collection_prob)).ln()
            + (mu / (params.doc_length + mu)).ln();

        score.max(0.0)
    }

    /// Divergence from randomness, I(F)/B/H2.
    ///
    /// tfn = tf * log2(1 + avgdl / dl)
    /// score = tfn * log2(1 + (N + 1) / (cf + 0.5)) * (cf + 1) / (df * (tfn + 1))
    fn score_dfr(params: &ScoreParams) -> f64 {
        if params.doc_freq <= 0.0 || params.avg_doc_length <= 0.0 {
            return 0.0;
        }

        let tfn = params.term_freq * (1.0 + params.avg_doc_length / params.doc_length).log2();
        if tfn <= 0.0 {
            return 0.0;
        }

        let basic_model = tfn * (1.0 + (params.doc_count + 1.0) / (params.collection_freq + 0.5)).log2();
        let after_effect = (params.collection_freq + 1.0) / (params.doc_freq * (tfn + 1.0));

        basic_model * after_effect
    }

    /// A short identifier for run tags and log lines.
    pub fn tag(&self) -> String {
        match *self {
            Similarity::Classic => "classic".to_string(),
            Similarity::Bm25 { k1, b } => format!("bm25-k{k1}-b{b}"),
            Similarity::LmJelinekMercer { lambda } => format!("lmjm-l{lambda}"),
            Similarity::LmDirichlet { mu } => format!("lmdir-mu{mu}"),
            Similarity::Dfr => "dfr-ifb2".to_string(),
        }
    }
}

impl Default for Similarity {
    fn default() -> Self {
        Similarity::bm25()
    }
}
