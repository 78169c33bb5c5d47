//! Scoring functions used when executing queries against an index.

pub mod similarity;

pub use self::similarity::{ScoreParams, Similarity};
