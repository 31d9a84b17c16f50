//! Buffered line-delimited JSON sink.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::SinkError;

/// An append-only, line-delimited JSON writer over one output file.
///
/// Writes are buffered; [`JsonlSink::finish`] flushes and reports the line
/// count. Any write failure is fatal for the batch.
pub struct JsonlSink {
    path: PathBuf,
    writer: BufWriter<File>,
    records: u64,
}

impl JsonlSink {
    /// Creates (or truncates) the sink file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| SinkError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    /// Appends one serializable value as a JSON line.
    pub fn append<T: serde::Serialize>(&mut self, value: &T) -> Result<(), SinkError> {
        let line = serde_json::to_string(value)?;
        self.append_raw(&line)
    }

    /// Appends one pre-serialized line verbatim.
    pub fn append_raw(&mut self, line: &str) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", line).map_err(|source| SinkError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.records += 1;
        Ok(())
    }

    /// Number of lines written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Flushes and closes the sink, returning its path and line count.
    pub fn finish(mut self) -> Result<(PathBuf, u64), SinkError> {
        self.writer.flush().map_err(|source| SinkError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok((self.path, self.records))
    }
}
