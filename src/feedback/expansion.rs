//! Turning a weighted term list into the final boolean query.

use crate::error::{PilumError, Result};
use crate::feedback::WordProbability;
use crate::query::{BooleanQuery, DEFAULT_MAX_CLAUSE_COUNT, TermQuery};

/// Builds the expanded query from a weighted term list.
///
/// Every usable term becomes one SHOULD clause with its expansion weight as
/// the boost. Terms containing `:` are skipped: downstream query parsing
/// would read them as a field override.
#[derive(Debug, Clone)]
pub struct ExpansionQueryBuilder {
    search_field: String,
    max_clauses: usize,
}

impl ExpansionQueryBuilder {
    /// Create a builder emitting clauses against `search_field`.
    pub fn new<S: Into<String>>(search_field: S) -> Self {
        ExpansionQueryBuilder {
            search_field: search_field.into(),
            max_clauses: DEFAULT_MAX_CLAUSE_COUNT,
        }
    }

    /// Override the clause-count limit.
    pub fn with_max_clauses(mut self, max_clauses: usize) -> Self {
        self.max_clauses = max_clauses;
        self
    }

    /// The field the clauses search against.
    pub fn search_field(&self) -> &str {
        &self.search_field
    }

    /// Build the expanded query.
    ///
    /// Returns an error if the clause count ends up above the limit; a query
    /// that large indicates a misconfigured term cap, not a recoverable
    /// per-term problem.
    pub fn build(&self, words: &[WordProbability]) -> Result<BooleanQuery> {
        let mut query = BooleanQuery::new();
        for word in words {
            if word.term.contains(':') {
                continue;
            }
            query.add_should(
                TermQuery::new(&self.search_field, &word.term)
                    .with_boost(word.expansion_weight as f32),
            );
        }
        if query.len() > self.max_clauses {
            return Err(PilumError::query(format!(
                "expanded query has {} clauses, limit is {}",
                query.len(),
                self.max_clauses
            )));
        }
        Ok(query)
    }
}
