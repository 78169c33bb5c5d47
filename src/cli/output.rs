//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, PilumArgs};
use crate::error::Result;
use crate::feedback::WordProbability;

/// Result structure for a batch retrieval run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResults {
    pub topics_run: usize,
    pub documents_indexed: usize,
    pub run_tag: String,
    pub res_file: String,
    pub duration_ms: u64,
}

/// Expansion terms computed for one topic.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopicExpansion {
    pub query_id: String,
    pub title: String,
    pub tokens: Vec<String>,
    pub terms: Vec<WordProbability>,
}

/// Result structure for the expand command.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpansionResults {
    pub topics: Vec<TopicExpansion>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &PilumArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &PilumArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    // Convert to JSON value for easier manipulation
    let value = serde_json::to_value(result)?;

    match result {
        _ if std::any::type_name::<T>().contains("ExpansionResults") => {
            output_expansion_human(&value, args)
        }
        _ => {
            // Generic output for other types
            output_generic_human(&value, args)
        }
    }
}

/// Output expansion terms in human format.
fn output_expansion_human(value: &serde_json::Value, _args: &PilumArgs) -> Result<()> {
    if let Some(obj) = value.as_object()
        && let Some(topics) = obj.get("topics").and_then(|t| t.as_array())
    {
        println!("Expansion Terms:");
        println!("════════════════");

        for topic in topics {
            println!();
            let query_id = topic.get("query_id").and_then(|q| q.as_str()).unwrap_or("?");
            let title = topic.get("title").and_then(|t| t.as_str()).unwrap_or("");
            println!("Topic {query_id}: {title}");
            println!("─────────────");

            if let Some(tokens) = topic.get("tokens").and_then(|t| t.as_array()) {
                let joined = tokens
                    .iter()
                    .filter_map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("tokens: {joined}");
            }

            println!("{:<28} {:>12} {:>12}", "term", "ranking", "expansion");
            if let Some(terms) = topic.get("terms").and_then(|t| t.as_array()) {
                for term in terms {
                    let word = term.get("term").and_then(|w| w.as_str()).unwrap_or("?");
                    let ranking = term
                        .get("ranking_weight")
                        .and_then(|r| r.as_f64())
                        .unwrap_or(0.0);
                    let expansion = term
                        .get("expansion_weight")
                        .and_then(|e| e.as_f64())
                        .unwrap_or(0.0);
                    println!("{word:<28} {ranking:>12.6} {expansion:>12.6}");
                }
            }
        }
    }
    Ok(())
}

/// Output generic data in human format.
fn output_generic_human(value: &serde_json::Value, _args: &PilumArgs) -> Result<()> {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(value);
            println!("{formatted_value}");
        }
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &PilumArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}
