//! Dataset output partitions.
//!
//! Four append-only JSONL streams: raw-success, raw-failure,
//! cleaned-success, cleaned-failure. A record lands in exactly one raw
//! stream; when cleaned streams are configured (the direct-example variant)
//! it additionally lands in the matching cleaned stream. Every stream is
//! line-delimited so partial runs concatenate cleanly.

mod sink;

pub use sink::JsonlSink;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::SinkError;
use crate::record::{Payload, Record};

/// Failure-stream line without the completion (`{prompt, errors}`).
#[derive(Serialize)]
struct FailureLine<'a> {
    prompt: &'a str,
    errors: &'a [String],
}

/// Failure-stream line carrying the completion for manual repair.
#[derive(Serialize)]
struct FullFailureLine<'a> {
    prompt: &'a str,
    completion: &'a str,
    errors: &'a [String],
}

/// Per-stream report emitted with the batch summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReport {
    pub path: PathBuf,
    pub records: u64,
}

/// The cleaned-pair stream pair, configured only for the direct variant.
struct CleanedStreams {
    success: JsonlSink,
    failure: JsonlSink,
}

/// The output sinks for one batch run.
pub struct OutputPartitions {
    raw_success: JsonlSink,
    raw_failure: JsonlSink,
    cleaned: Option<CleanedStreams>,
}

impl OutputPartitions {
    /// Opens the two raw streams only (template variant).
    pub fn raw_only(
        success: impl AsRef<Path>,
        failure: impl AsRef<Path>,
    ) -> Result<Self, SinkError> {
        Ok(Self {
            raw_success: JsonlSink::create(success)?,
            raw_failure: JsonlSink::create(failure)?,
            cleaned: None,
        })
    }

    /// Opens all four streams (direct variant).
    pub fn with_cleaned(
        success: impl AsRef<Path>,
        failure: impl AsRef<Path>,
        cleaned_success: impl AsRef<Path>,
        cleaned_failure: impl AsRef<Path>,
    ) -> Result<Self, SinkError> {
        Ok(Self {
            raw_success: JsonlSink::create(success)?,
            raw_failure: JsonlSink::create(failure)?,
            cleaned: Some(CleanedStreams {
                success: JsonlSink::create(cleaned_success)?,
                failure: JsonlSink::create(cleaned_failure)?,
            }),
        })
    }

    /// Routes a record whose program compiled.
    ///
    /// Direct records are re-serialized as `{prompt, completion}`; template
    /// records replay the original input line verbatim.
    pub fn route_success(&mut self, record: &Record) -> Result<(), SinkError> {
        match &record.payload {
            Payload::Direct(example) => {
                self.raw_success.append(example)?;
                if let Some(cleaned) = &mut self.cleaned {
                    cleaned.success.append(example)?;
                }
            }
            Payload::Template(_) => {
                self.raw_success.append_raw(&record.raw_line)?;
            }
        }
        Ok(())
    }

    /// Routes a record whose program failed to compile, carrying its
    /// formatted diagnostics.
    pub fn route_failure(&mut self, record: &Record, errors: &[String]) -> Result<(), SinkError> {
        match &record.payload {
            Payload::Direct(_) => {
                self.raw_failure.append(&FailureLine {
                    prompt: record.prompt(),
                    errors,
                })?;
                if let Some(cleaned) = &mut self.cleaned {
                    cleaned.failure.append(&FullFailureLine {
                        prompt: record.prompt(),
                        completion: record.completion(),
                        errors,
                    })?;
                }
            }
            Payload::Template(_) => {
                self.raw_failure.append(&FullFailureLine {
                    prompt: record.prompt(),
                    completion: record.completion(),
                    errors,
                })?;
            }
        }
        Ok(())
    }

    /// Flushes and closes every stream, reporting per-stream counts.
    pub fn finish(self) -> Result<Vec<StreamReport>, SinkError> {
        let mut sinks = vec![self.raw_success, self.raw_failure];
        if let Some(cleaned) = self.cleaned {
            sinks.push(cleaned.success);
            sinks.push(cleaned.failure);
        }
        let mut reports = Vec::new();
        for sink in sinks {
            let (path, records) = sink.finish()?;
            reports.push(StreamReport { path, records });
        }
        Ok(reports)
    }
}
