//! TREC res file output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::feedback::pipeline::RankedDocument;

/// Writes rankings in the TREC res format, one line per document:
///
/// ```text
/// queryId  Q0  documentId  rank  score  runTag
/// ```
///
/// Fields are tab-separated and ranks are 0-based, matching what downstream
/// evaluation tooling expects from this family of runs.
#[derive(Debug)]
pub struct RunWriter<W: Write> {
    writer: W,
    run_tag: String,
}

impl RunWriter<BufWriter<File>> {
    /// Create a res file at `path`, truncating any existing one.
    pub fn create<P: AsRef<Path>, S: Into<String>>(path: P, run_tag: S) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(RunWriter::new(BufWriter::new(file), run_tag))
    }
}

impl<W: Write> RunWriter<W> {
    /// Wrap an arbitrary writer.
    pub fn new<S: Into<String>>(writer: W, run_tag: S) -> Self {
        RunWriter {
            writer,
            run_tag: run_tag.into(),
        }
    }

    /// Append one query's ranking.
    pub fn write_query(&mut self, query_id: &str, results: &[RankedDocument]) -> Result<()> {
        for (rank, result) in results.iter().enumerate() {
            writeln!(
                self.writer,
                "{}\tQ0\t{}\t{}\t{}\t{}",
                query_id, result.doc_name, rank, result.score, self.run_tag
            )?;
        }
        Ok(())
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(entries: &[(&str, f32)]) -> Vec<RankedDocument> {
        entries
            .iter()
            .map(|(doc_name, score)| RankedDocument {
                doc_name: doc_name.to_string(),
                score: *score,
            })
            .collect()
    }

    #[test]
    fn test_res_line_format() {
        let mut writer = RunWriter::new(Vec::new(), "bm25-k1.2-b0.75-D10-T60-rm3");
        writer
            .write_query("301", &results(&[("FBIS3-0001", 7.25), ("FBIS3-0002", 6.5)]))
            .unwrap();
        writer.flush().unwrap();

        let output = String::from_utf8(writer.writer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "301\tQ0\tFBIS3-0001\t0\t7.25\tbm25-k1.2-b0.75-D10-T60-rm3");
        assert_eq!(lines[1], "301\tQ0\tFBIS3-0002\t1\t6.5\tbm25-k1.2-b0.75-D10-T60-rm3");
    }

    #[test]
    fn test_ranks_restart_per_query() {
        let mut writer = RunWriter::new(Vec::new(), "tag");
        writer.write_query("301", &results(&[("A", 2.0)])).unwrap();
        writer.write_query("302", &results(&[("B", 3.0)])).unwrap();

        let output = String::from_utf8(writer.writer).unwrap();
        assert!(output.contains("301\tQ0\tA\t0\t2\ttag"));
        assert!(output.contains("302\tQ0\tB\t0\t3\ttag"));
    }

    #[test]
    fn test_empty_ranking_writes_nothing() {
        let mut writer = RunWriter::new(Vec::new(), "tag");
        writer.write_query("301", &[]).unwrap();
        assert!(writer.writer.is_empty());
    }

    #[test]
    fn test_create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.res");
        {
            let mut writer = RunWriter::create(&path, "tag").unwrap();
            writer.write_query("301", &results(&[("DOC-1", 1.5)])).unwrap();
            writer.flush().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "301\tQ0\tDOC-1\t0\t1.5\ttag\n");
    }
}
