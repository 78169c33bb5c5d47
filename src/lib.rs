//! # Pilum
//!
//! Pseudo-relevance feedback retrieval with relevance-based language models.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - In-memory inverted index with pluggable ranking functions
//! - Flexible text analysis pipeline
//! - RM3 query expansion with three IDF-weighted variants
//! - TREC topic input and res file output

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod index;
pub mod query;
pub mod search;
pub mod trec;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
