//! Query system for searching documents.
//!
//! Queries in Pilum are plain data: a [`TermQuery`] names a field and a term,
//! and a [`BooleanQuery`] combines term clauses with occurrence rules. The
//! index searcher evaluates them against its postings with a configurable
//! similarity function. Expanded feedback queries are boolean queries whose
//! SHOULD clauses carry per-term boosts.

pub mod boolean;
pub mod term;

pub use self::boolean::{BooleanClause, BooleanQuery, DEFAULT_MAX_CLAUSE_COUNT, Occur};
pub use self::term::TermQuery;
