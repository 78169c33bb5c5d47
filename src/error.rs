//! Error types for the Pilum library.
//!
//! All fallible operations in the crate return [`Result`], whose error type is
//! the [`PilumError`] enum. Per-document and per-term statistic gaps during
//! feedback collection are not errors (they degrade locally, see the feedback
//! module); everything surfaced here is fatal for the query or run that hit it.
//!
//! # Examples
//!
//! ```
//! use pilum::error::{PilumError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PilumError::invalid_config("query_mix must lie in [0, 1]"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Pilum operations.
///
/// Uses the `thiserror` crate for the `Error` trait implementation and
/// provides constructor methods for the common cases.
#[derive(Error, Debug)]
pub enum PilumError {
    /// I/O errors (corpus, topic, stopword and run files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index-related errors (the search/index collaborator failed)
    #[error("Index error: {0}")]
    Index(String),

    /// Analysis-related errors (tokenization, filtering)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors (expansion query construction, parsing)
    #[error("Query error: {0}")]
    Query(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PilumError.
pub type Result<T> = std::result::Result<T, PilumError>;

impl PilumError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        PilumError::Index(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        PilumError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        PilumError::Query(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        PilumError::Query(msg.into()) // Parse errors are treated as query errors
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PilumError::Other(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PilumError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        PilumError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        PilumError::Other(format!("Not found: {}", msg.into()))
    }
}
