//! Corpus loading from JSON Lines files.
//!
//! A corpus file holds one JSON object per line. The `id` key (or `docno`,
//! the TREC convention) names the document; every other key with a string
//! value becomes an indexed field. Non-string values are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::error::{PilumError, Result};

/// One document read from a corpus file, not yet analyzed.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusDocument {
    /// External document name, used in run output.
    pub id: String,
    /// Field name and raw text pairs.
    pub fields: Vec<(String, String)>,
}

impl CorpusDocument {
    /// Borrow the fields in the shape `MemoryIndex::add_document` expects.
    pub fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .map(|(name, text)| (name.as_str(), text.as_str()))
            .collect()
    }
}

/// Read every document from a JSONL corpus file.
///
/// Blank lines are skipped. A line that is not a JSON object, or that lacks a
/// document identifier, is an error naming the offending line number.
pub fn read_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<CorpusDocument>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);

    let mut documents = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(&line)?;
        documents.push(parse_document(&value, line_number + 1)?);
    }

    Ok(documents)
}

fn parse_document(value: &Value, line_number: usize) -> Result<CorpusDocument> {
    let Some(object) = value.as_object() else {
        return Err(PilumError::parse(format!(
            "corpus line {line_number}: expected a JSON object"
        )));
    };

    let id = object
        .get("id")
        .or_else(|| object.get("docno"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            PilumError::parse(format!(
                "corpus line {line_number}: missing string 'id' (or 'docno') key"
            ))
        })?
        .to_string();

    let fields = object
        .iter()
        .filter(|(key, _)| key.as_str() != "id" && key.as_str() != "docno")
        .filter_map(|(key, value)| {
            value
                .as_str()
                .map(|text| (key.clone(), text.to_string()))
        })
        .collect();

    Ok(CorpusDocument { id, fields })
}
