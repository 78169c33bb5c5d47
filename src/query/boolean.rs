//! Boolean query implementation for combining term queries.

use crate::query::term::TermQuery;

/// Default upper bound on the number of clauses a boolean query may hold.
///
/// Expanded feedback queries grow with the number of selected expansion terms
/// plus the original query tokens; this cap keeps runaway configurations from
/// building unbounded queries.
pub const DEFAULT_MAX_CLAUSE_COUNT: usize = 4096;

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must not match (equivalent to NOT).
    MustNot,
}

/// A clause in a boolean query.
#[derive(Debug, Clone)]
pub struct BooleanClause {
    /// The query for this clause.
    pub query: TermQuery,
    /// The occurrence requirement.
    pub occur: Occur,
}

impl BooleanClause {
    /// Create a new boolean clause.
    pub fn new(query: TermQuery, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }

    /// Create a MUST clause.
    pub fn must(query: TermQuery) -> Self {
        BooleanClause::new(query, Occur::Must)
    }

    /// Create a SHOULD clause.
    pub fn should(query: TermQuery) -> Self {
        BooleanClause::new(query, Occur::Should)
    }

    /// Create a MUST_NOT clause.
    pub fn must_not(query: TermQuery) -> Self {
        BooleanClause::new(query, Occur::MustNot)
    }
}

/// A boolean query that combines term queries with boolean logic.
///
/// Scoring is additive over matching SHOULD and MUST clauses; each clause
/// contributes its similarity score scaled by the clause boost.
#[derive(Debug, Clone, Default)]
pub struct BooleanQuery {
    /// The clauses in this boolean query.
    clauses: Vec<BooleanClause>,
}

impl BooleanQuery {
    /// Create a new empty boolean query.
    pub fn new() -> Self {
        BooleanQuery {
            clauses: Vec::new(),
        }
    }

    /// Add a clause to this boolean query.
    pub fn add_clause(&mut self, clause: BooleanClause) {
        self.clauses.push(clause);
    }

    /// Add a MUST clause.
    pub fn add_must(&mut self, query: TermQuery) {
        self.add_clause(BooleanClause::must(query));
    }

    /// Add a SHOULD clause.
    pub fn add_should(&mut self, query: TermQuery) {
        self.add_clause(BooleanClause::should(query));
    }

    /// Add a MUST_NOT clause.
    pub fn add_must_not(&mut self, query: TermQuery) {
        self.add_clause(BooleanClause::must_not(query));
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    /// Get the number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Check if this query has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Get clauses by occurrence type.
    pub fn clauses_by_occur(&self, occur: Occur) -> Vec<&BooleanClause> {
        self.clauses.iter().filter(|c| c.occur == occur).collect()
    }

    /// Get a human-readable description of this query.
    pub fn description(&self) -> String {
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let prefix = match clause.occur {
                    Occur::Must => "+",
                    Occur::Should => "",
                    Occur::MustNot => "-",
                };
                format!("{}{}", prefix, clause.query.description())
            })
            .collect();
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_query_creation() {
        let query = BooleanQuery::new();
        assert!(query.is_empty());
        assert_eq!(query.len(), 0);
    }

    #[test]
    fn test_add_clauses() {
        let mut query = BooleanQuery::new();
        query.add_should(TermQuery::new("content", "oil"));
        query.add_should(TermQuery::new("content", "spill"));
        query.add_must(TermQuery::new("content", "tanker"));

        assert_eq!(query.len(), 3);
        assert_eq!(query.clauses_by_occur(Occur::Should).len(), 2);
        assert_eq!(query.clauses_by_occur(Occur::Must).len(), 1);
        assert!(query.clauses_by_occur(Occur::MustNot).is_empty());
    }

    #[test]
    fn test_clause_constructors() {
        let must = BooleanClause::must(TermQuery::new("content", "a"));
        assert_eq!(must.occur, Occur::Must);

        let should = BooleanClause::should(TermQuery::new("content", "b"));
        assert_eq!(should.occur, Occur::Should);

        let must_not = BooleanClause::must_not(TermQuery::new("content", "c"));
        assert_eq!(must_not.occur, Occur::MustNot);
    }

    #[test]
    fn test_description() {
        let mut query = BooleanQuery::new();
        query.add_must(TermQuery::new("content", "oil"));
        query.add_should(TermQuery::new("content", "spill").with_boost(0.5));
        query.add_must_not(TermQuery::new("content", "cooking"));

        assert_eq!(
            query.description(),
            "+content:oil content:spill^0.5 -content:cooking"
        );
    }
}
