//! TREC topic file parsing.
//!
//! Two layouts are recognized and auto-detected. The classic tagged format:
//!
//! ```text
//! <top>
//! <num> Number: 301
//! <title> International Organized Crime
//! <desc> Description: ...
//! </top>
//! ```
//!
//! and a plain tab-separated `id<TAB>title` layout, one topic per line.
//! Only the topic number and title are kept; descriptions and narratives are
//! skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{PilumError, Result};

/// One query of a TREC topic file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrecTopic {
    /// Topic number, kept as text (`"301"`).
    pub id: String,
    /// Title text, the query that gets analyzed and searched.
    pub title: String,
}

impl TrecTopic {
    /// Create a topic.
    pub fn new<I: Into<String>, T: Into<String>>(id: I, title: T) -> Self {
        TrecTopic {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Read a topic file, auto-detecting the layout: a file whose first
/// non-blank line starts with `<` is parsed as tagged, anything else as
/// tab-separated.
pub fn read_topics<P: AsRef<Path>>(path: P) -> Result<Vec<TrecTopic>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }

    let tagged = lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .is_some_and(|l| l.starts_with('<'));

    if tagged {
        parse_tagged(&lines)
    } else {
        parse_tab_separated(&lines)
    }
}

fn parse_tagged(lines: &[String]) -> Result<Vec<TrecTopic>> {
    let mut topics = Vec::new();
    let mut id: Option<String> = None;
    let mut title = String::new();
    let mut in_title = false;

    for line in lines {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("<num>") {
            id = Some(strip_label(rest, "Number:").to_string());
            in_title = false;
        } else if let Some(rest) = line.strip_prefix("<title>") {
            title = strip_label(rest, "Topic:").to_string();
            in_title = true;
        } else if line.starts_with("</top>") {
            let id = id.take().ok_or_else(|| {
                PilumError::parse(format!("topic block without <num> (title: '{title}')"))
            })?;
            topics.push(TrecTopic::new(id, std::mem::take(&mut title)));
            in_title = false;
        } else if line.starts_with('<') {
            // <top>, <desc>, <narr> and anything else ends a running title.
            in_title = false;
        } else if in_title && !line.is_empty() {
            // Titles may wrap onto continuation lines.
            if !title.is_empty() {
                title.push(' ');
            }
            title.push_str(line);
        }
    }

    Ok(topics)
}

fn parse_tab_separated(lines: &[String]) -> Result<Vec<TrecTopic>> {
    let mut topics = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (id, title) = line.split_once('\t').ok_or_else(|| {
            PilumError::parse(format!("topic line {} has no tab separator", i + 1))
        })?;
        topics.push(TrecTopic::new(id.trim(), title.trim()));
    }
    Ok(topics)
}

/// Drop an inline label such as `Number:` that the tagged format places
/// after the tag, then trim.
fn strip_label<'a>(text: &'a str, label: &str) -> &'a str {
    let text = text.trim();
    text.strip_prefix(label).unwrap_or(text).trim()
}
