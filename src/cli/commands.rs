//! Command implementations for the Pilum CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::analysis::{Analyzer, StandardAnalyzer};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::PipelineConfig;
use crate::error::{PilumError, Result};
use crate::feedback::{RetrievalPipeline, RmVariant};
use crate::index::{MemoryIndex, SearchIndex, read_jsonl};
use crate::search::Similarity;
use crate::trec::{RunWriter, read_topics};

/// Execute a CLI command.
pub fn execute_command(args: PilumArgs) -> Result<()> {
    match &args.command {
        Command::Search(search_args) => run_search(search_args.clone(), &args),
        Command::Expand(expand_args) => run_expand(expand_args.clone(), &args),
    }
}

/// Run every topic through the pipeline and write a TREC res file.
fn run_search(args: SearchArgs, cli_args: &PilumArgs) -> Result<()> {
    let config = pipeline_config(&args.options)?;
    let start_time = Instant::now();

    if cli_args.verbosity() > 0 {
        println!("Loading corpus from: {}", args.corpus_file.display());
    }

    let analyzer = build_analyzer(args.options.stop_file.as_deref())?;
    let index = build_index(&args.corpus_file, &analyzer, config.similarity)?;
    let documents_indexed = index.doc_count() as usize;

    if cli_args.verbosity() > 0 {
        println!("Indexed {documents_indexed} documents");
    }

    let topics = read_topics(&args.topics_file)?;
    let pipeline = RetrievalPipeline::new(Arc::new(index), analyzer, config)?;
    let run_tag = pipeline.config().run_tag();

    fs::create_dir_all(&args.output_dir)?;
    let res_file = res_file_path(&args.output_dir, &args.topics_file, &run_tag);
    let mut writer = RunWriter::create(&res_file, &run_tag)?;

    for topic in &topics {
        let outcome = pipeline.run(&topic.id, &topic.title)?;
        writer.write_query(&topic.id, &outcome.results)?;

        if cli_args.verbosity() > 0 {
            println!(
                "{}: {} initial hits, {} feedback docs, {} results",
                topic.id,
                outcome.initial_hit_count,
                outcome.feedback_doc_count,
                outcome.results.len()
            );
        }
        if cli_args.verbosity() > 1 {
            println!("  tokens: {}", outcome.tokens.join(" "));
            println!("  expanded: {}", outcome.expanded_query);
        }
    }
    writer.flush()?;

    output_result(
        "Run complete",
        &RunResults {
            topics_run: topics.len(),
            documents_indexed,
            run_tag,
            res_file: res_file.to_string_lossy().to_string(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )?;

    Ok(())
}

/// Print the expansion terms for one topic or for all of them.
fn run_expand(args: ExpandArgs, cli_args: &PilumArgs) -> Result<()> {
    let config = pipeline_config(&args.options)?;

    if cli_args.verbosity() > 0 {
        println!("Loading corpus from: {}", args.corpus_file.display());
    }

    let analyzer = build_analyzer(args.options.stop_file.as_deref())?;
    let index = build_index(&args.corpus_file, &analyzer, config.similarity)?;

    let mut topics = read_topics(&args.topics_file)?;
    if let Some(topic_id) = &args.topic_id {
        topics.retain(|topic| &topic.id == topic_id);
        if topics.is_empty() {
            return Err(PilumError::not_found(format!(
                "topic '{topic_id}' not found in {}",
                args.topics_file.display()
            )));
        }
    }

    let pipeline = RetrievalPipeline::new(Arc::new(index), analyzer, config)?;

    let mut results = ExpansionResults { topics: Vec::new() };
    for topic in &topics {
        let outcome = pipeline.run(&topic.id, &topic.title)?;
        results.topics.push(TopicExpansion {
            query_id: outcome.query_id,
            title: topic.title.clone(),
            tokens: outcome.tokens,
            terms: outcome.expansion,
        });
    }

    output_result("Expansion complete", &results, cli_args)?;

    Ok(())
}

/// Build the effective pipeline configuration: config file first (defaults
/// when absent), then individual flags override.
fn pipeline_config(options: &PipelineOptions) -> Result<PipelineConfig> {
    let mut config = match &options.config_file {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(choice) = options.variant {
        config.variant = variant_of(choice);
    }
    if let Some(choice) = options.similarity {
        config.similarity = similarity_of(choice);
    }
    if let Some(n) = options.feedback_docs {
        config.feedback.num_feedback_docs = n;
    }
    if let Some(n) = options.feedback_terms {
        config.feedback.num_feedback_terms = n;
    }
    if let Some(lambda) = options.mixing_lambda {
        config.feedback.mixing_lambda = lambda;
    }
    if let Some(mix) = options.query_mix {
        config.feedback.query_mix = mix;
    }
    if let Some(field) = &options.search_field {
        config.search_field = field.clone();
    }
    if let Some(field) = &options.feedback_field {
        config.feedback_field = field.clone();
    }
    if let Some(top_k) = options.top_k {
        config.top_k_initial = top_k;
    }
    if let Some(max) = options.max_clauses {
        config.max_expansion_clauses = max;
    }

    Ok(config)
}

/// Map a CLI variant choice onto the estimator variant.
fn variant_of(choice: VariantChoice) -> RmVariant {
    match choice {
        VariantChoice::Rm3 => RmVariant::Rm3,
        VariantChoice::Rm3Idf1 => RmVariant::Rm3Idf1,
        VariantChoice::Rm3Idf2 => RmVariant::Rm3Idf2,
        VariantChoice::Rm3Idf3 => RmVariant::Rm3Idf3,
    }
}

/// Map a CLI similarity choice onto a ranking function with conventional
/// parameters. A config file can set exact parameters instead.
fn similarity_of(choice: SimilarityChoice) -> Similarity {
    match choice {
        SimilarityChoice::Classic => Similarity::Classic,
        SimilarityChoice::Bm25 => Similarity::bm25(),
        SimilarityChoice::Lmjm => Similarity::lm_jelinek_mercer(0.7),
        SimilarityChoice::Lmdir => Similarity::lm_dirichlet(2000.0),
        SimilarityChoice::Dfr => Similarity::Dfr,
    }
}

/// Build the analyzer shared by indexing and query analysis.
fn build_analyzer(stop_file: Option<&Path>) -> Result<Arc<dyn Analyzer>> {
    let analyzer = match stop_file {
        Some(path) => StandardAnalyzer::with_stop_words_file(path)?,
        None => StandardAnalyzer::new()?,
    };
    Ok(Arc::new(analyzer))
}

/// Read a JSONL corpus and index every document in memory.
fn build_index(
    corpus_file: &Path,
    analyzer: &Arc<dyn Analyzer>,
    similarity: Similarity,
) -> Result<MemoryIndex> {
    let documents = read_jsonl(corpus_file)?;
    let mut index = MemoryIndex::new(analyzer.clone()).with_similarity(similarity);
    for document in &documents {
        index.add_document(document.id.clone(), &document.field_refs())?;
    }
    Ok(index)
}

/// Res file path: `{topics-file-name}-{run-tag}.res` in the output directory.
fn res_file_path(output_dir: &Path, topics_file: &Path, run_tag: &str) -> PathBuf {
    let topics_name = topics_file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "topics".to_string());
    output_dir.join(format!("{topics_name}-{run_tag}.res"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_variant_mapping() {
        assert_eq!(variant_of(VariantChoice::Rm3), RmVariant::Rm3);
        assert_eq!(variant_of(VariantChoice::Rm3Idf3), RmVariant::Rm3Idf3);
    }

    #[test]
    fn test_similarity_mapping_uses_conventional_parameters() {
        assert_eq!(similarity_of(SimilarityChoice::Bm25), Similarity::bm25());
        assert_eq!(
            similarity_of(SimilarityChoice::Lmdir),
            Similarity::LmDirichlet { mu: 2000.0 }
        );
    }

    #[test]
    fn test_res_file_path_uses_topics_file_name() {
        let path = res_file_path(
            Path::new("runs"),
            Path::new("/data/topics.401-450"),
            "bm25-k1.2-b0.75-D10-T60-rm3-queryMix-0.5-content-content",
        );
        assert_eq!(
            path,
            PathBuf::from(
                "runs/topics.401-450-bm25-k1.2-b0.75-D10-T60-rm3-queryMix-0.5-content-content.res"
            )
        );
    }

    #[test]
    fn test_flags_override_config_file() {
        let config_file = write_temp(r#"{ "variant": "rm3", "top_k_initial": 50 }"#);
        let args = match PilumArgs::try_parse_from([
            "pilum",
            "search",
            "corpus.jsonl",
            "topics.txt",
            "--config-file",
            config_file.path().to_str().unwrap(),
            "--variant",
            "rm3-idf2",
            "--feedback-terms",
            "5",
        ])
        .unwrap()
        .command
        {
            Command::Search(search_args) => search_args,
            _ => panic!("Expected Search command"),
        };

        let config = pipeline_config(&args.options).unwrap();
        // Flag wins over the file, file wins over the default.
        assert_eq!(config.variant, RmVariant::Rm3Idf2);
        assert_eq!(config.top_k_initial, 50);
        assert_eq!(config.feedback.num_feedback_terms, 5);
        assert_eq!(config.feedback.num_feedback_docs, 10);
    }

    #[test]
    fn test_search_command_writes_res_file() {
        let corpus = write_temp(concat!(
            r#"{"id": "DOC-1", "content": "oil spill tanker"}"#,
            "\n",
            r#"{"id": "DOC-2", "content": "oil spill cleanup"}"#,
            "\n",
            r#"{"id": "DOC-3", "content": "weather report"}"#,
            "\n",
        ));
        let topics = write_temp("301\toil spill\n");
        let output_dir = tempfile::tempdir().unwrap();

        let args = PilumArgs::try_parse_from([
            "pilum",
            "--quiet",
            "search",
            corpus.path().to_str().unwrap(),
            topics.path().to_str().unwrap(),
            "--output-dir",
            output_dir.path().to_str().unwrap(),
            "--feedback-docs",
            "2",
            "--feedback-terms",
            "5",
        ])
        .unwrap();

        execute_command(args).unwrap();

        let entries: Vec<_> = fs::read_dir(output_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1);
        let content = fs::read_to_string(&entries[0]).unwrap();
        // Both matching documents appear; the off-topic one does not.
        assert!(content.contains("DOC-1"));
        assert!(content.contains("DOC-2"));
        assert!(!content.contains("DOC-3"));
        for line in content.lines() {
            assert_eq!(line.split('\t').count(), 6);
        }
    }

    #[test]
    fn test_expand_unknown_topic_fails() {
        let corpus = write_temp(concat!(r#"{"id": "DOC-1", "content": "oil spill"}"#, "\n"));
        let topics = write_temp("301\toil spill\n");

        let args = PilumArgs::try_parse_from([
            "pilum",
            "--quiet",
            "expand",
            corpus.path().to_str().unwrap(),
            topics.path().to_str().unwrap(),
            "--topic-id",
            "999",
        ])
        .unwrap();

        assert!(execute_command(args).is_err());
    }
}
