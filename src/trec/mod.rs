//! TREC experiment plumbing: topic files in, res files out.

pub mod run;
pub mod topics;

pub use run::RunWriter;
pub use topics::{TrecTopic, read_topics};
