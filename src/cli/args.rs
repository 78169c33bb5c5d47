//! Command line argument parsing for the Pilum CLI using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pilum - pseudo-relevance feedback retrieval
#[derive(Parser, Debug, Clone)]
#[command(name = "pilum")]
#[command(about = "Query expansion with relevance-based language models")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Pilum Contributors")]
#[command(long_about = None)]
pub struct PilumArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PilumArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run a batch of topics and write a TREC res file
    Search(SearchArgs),

    /// Show the expansion terms a topic would be expanded with
    Expand(ExpandArgs),
}

/// Pipeline options shared by every command that runs the feedback pipeline.
///
/// Each flag overrides the corresponding value from the configuration file
/// (or the default when no file is given).
#[derive(Args, Debug, Clone)]
pub struct PipelineOptions {
    /// Pipeline configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Stop word file, one word per line
    #[arg(long, value_name = "STOP_FILE")]
    pub stop_file: Option<PathBuf>,

    /// Relevance-model variant
    #[arg(long)]
    pub variant: Option<VariantChoice>,

    /// Ranking function for both retrieval passes
    #[arg(long)]
    pub similarity: Option<SimilarityChoice>,

    /// Number of feedback documents drawn from the initial ranking
    #[arg(long)]
    pub feedback_docs: Option<usize>,

    /// Number of expansion terms kept after weighting
    #[arg(long)]
    pub feedback_terms: Option<usize>,

    /// Document-model smoothing weight in [0, 1]
    #[arg(long)]
    pub mixing_lambda: Option<f64>,

    /// Query-model interpolation weight in [0, 1]
    #[arg(long)]
    pub query_mix: Option<f64>,

    /// Field the queries search against
    #[arg(long)]
    pub search_field: Option<String>,

    /// Field feedback statistics are drawn from
    #[arg(long)]
    pub feedback_field: Option<String>,

    /// Result depth of both retrieval passes
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Upper bound on the number of clauses in the expanded query
    #[arg(long)]
    pub max_clauses: Option<usize>,
}

/// Arguments for a batch retrieval run
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Corpus file, one JSON document per line
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus_file: PathBuf,

    /// Topics file (TREC tagged format or id<TAB>title lines)
    #[arg(value_name = "TOPICS_FILE")]
    pub topics_file: PathBuf,

    /// Directory the res file is written into
    #[arg(short, long, value_name = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Pipeline options
    #[command(flatten)]
    pub options: PipelineOptions,
}

/// Arguments for inspecting expansion terms
#[derive(Parser, Debug, Clone)]
pub struct ExpandArgs {
    /// Corpus file, one JSON document per line
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus_file: PathBuf,

    /// Topics file (TREC tagged format or id<TAB>title lines)
    #[arg(value_name = "TOPICS_FILE")]
    pub topics_file: PathBuf,

    /// Expand only this topic (default: all topics)
    #[arg(short, long, value_name = "TOPIC_ID")]
    pub topic_id: Option<String>,

    /// Pipeline options
    #[command(flatten)]
    pub options: PipelineOptions,
}

/// Relevance-model variants selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantChoice {
    /// Plain RM3 interpolation
    Rm3,
    /// IDF weighting before term selection
    Rm3Idf1,
    /// IDF weighting after query mixing, then reselection
    Rm3Idf2,
    /// IDF weighting of the ranking channel only
    Rm3Idf3,
}

/// Ranking functions selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityChoice {
    /// Classic TF-IDF with vector-space normalization
    Classic,
    /// Okapi BM25 (k1=1.2, b=0.75)
    Bm25,
    /// Jelinek-Mercer language model (lambda=0.7)
    Lmjm,
    /// Dirichlet language model (mu=2000)
    Lmdir,
    /// Divergence from randomness
    Dfr,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
