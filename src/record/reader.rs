//! Lazy JSONL record reader.
//!
//! Consumes one JSON object per line. Blank lines are skipped silently;
//! structurally malformed lines are skipped with a warning and counted, so a
//! bad line never aborts the batch. Re-running over the same input yields the
//! same records in the same order.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

use tracing::warn;

use super::{DirectExample, Payload, Record, TemplateExample};

/// Which record schema the reader expects, one per validator variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `{prompt, completion}` objects.
    Direct,
    /// `{prompt_template, completion_template, vars_needed}` objects.
    Template,
}

/// Iterator over parsed records in an input file.
pub struct RecordReader<R: BufRead> {
    lines: Lines<R>,
    kind: RecordKind,
    line_no: u64,
    seq: u64,
    skipped: u64,
}

impl RecordReader<BufReader<File>> {
    /// Opens a reader over a JSONL file.
    pub fn from_path(path: impl AsRef<Path>, kind: RecordKind) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), kind))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Creates a reader over any buffered source.
    pub fn new(source: R, kind: RecordKind) -> Self {
        Self {
            lines: source.lines(),
            kind,
            line_no: 0,
            seq: 0,
            skipped: 0,
        }
    }

    /// Number of non-blank lines skipped because they failed to parse.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn parse(&self, line: &str) -> Result<Payload, serde_json::Error> {
        match self.kind {
            RecordKind::Direct => {
                serde_json::from_str::<DirectExample>(line).map(Payload::Direct)
            }
            RecordKind::Template => {
                serde_json::from_str::<TemplateExample>(line).map(Payload::Template)
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            match self.parse(&line) {
                Ok(payload) => {
                    let record = Record {
                        seq: self.seq,
                        raw_line: line,
                        payload,
                    };
                    self.seq += 1;
                    return Some(Ok(record));
                }
                Err(e) => {
                    self.skipped += 1;
                    warn!(line = self.line_no, error = %e, "skipping malformed record");
                }
            }
        }
    }
}
