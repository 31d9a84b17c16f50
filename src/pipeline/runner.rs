//! Batch pipeline runner.
//!
//! Drives each record through mock synthesis, harness wrapping, the
//! compilation oracle, diagnostic remapping, and partition routing. Records
//! are independent, so compilation fans out over a bounded worker pool; a
//! sequence-ordered drain keeps every output stream in input order, making
//! reruns byte-identical.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::{OracleError, PipelineError};
use crate::harness::HarnessWrapper;
use crate::mock::{MockSynthesizer, ResolvedSnippet};
use crate::oracle::{remap_diagnostics, CompileOracle, Verdict};
use crate::partition::{OutputPartitions, StreamReport};
use crate::record::{Payload, Record, RecordReader};

/// Terminal report for one batch run.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// Records that reached the oracle.
    pub processed: u64,
    /// Malformed lines skipped by the reader.
    pub skipped: u64,
    /// Records routed to the success streams.
    pub succeeded: u64,
    /// Records routed to the failure streams.
    pub failed: u64,
    /// Per-stream output paths and counts.
    pub streams: Vec<StreamReport>,
}

impl BatchSummary {
    /// Logs the terminal summary the way the batch operator reads it:
    /// one line per output stream plus the totals.
    pub fn log(&self) {
        info!(
            processed = self.processed,
            skipped = self.skipped,
            succeeded = self.succeeded,
            failed = self.failed,
            "validation complete"
        );
        for stream in &self.streams {
            info!(path = %stream.path.display(), records = stream.records, "output stream");
        }
    }
}

/// The record-validation pipeline.
pub struct ValidationPipeline {
    oracle: Arc<dyn CompileOracle>,
    synthesizer: Arc<MockSynthesizer>,
    wrapper: Arc<HarnessWrapper>,
    max_concurrent: usize,
}

/// Outcome of one record's trip through the oracle: `None` for success,
/// formatted diagnostics for failure.
type RecordOutcome = Option<Vec<String>>;

impl ValidationPipeline {
    pub fn new(
        oracle: Arc<dyn CompileOracle>,
        synthesizer: MockSynthesizer,
        wrapper: HarnessWrapper,
        max_concurrent: usize,
    ) -> Self {
        Self {
            oracle,
            synthesizer: Arc::new(synthesizer),
            wrapper: Arc::new(wrapper),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Runs the batch: every parsed record ends in exactly one of
    /// {skipped, success-routed, failure-routed}. Sinks are flushed and
    /// closed on every exit path before an error propagates.
    pub async fn run<R: BufRead>(
        &self,
        input_path: &Path,
        reader: &mut RecordReader<R>,
        mut partitions: OutputPartitions,
    ) -> Result<BatchSummary, PipelineError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut workers: JoinSet<(u64, Record, Result<RecordOutcome, OracleError>)> =
            JoinSet::new();

        for next in reader.by_ref() {
            let record = match next {
                Ok(record) => record,
                Err(source) => {
                    workers.abort_all();
                    let _ = partitions.finish();
                    return Err(PipelineError::Input {
                        path: PathBuf::from(input_path),
                        source,
                    });
                }
            };
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    workers.abort_all();
                    let _ = partitions.finish();
                    return Err(PipelineError::Worker(e.to_string()));
                }
            };
            let oracle = Arc::clone(&self.oracle);
            let synthesizer = Arc::clone(&self.synthesizer);
            let wrapper = Arc::clone(&self.wrapper);
            workers.spawn(async move {
                let _permit = permit;
                let seq = record.seq;
                let outcome = judge_record(&record, &synthesizer, &wrapper, oracle.as_ref()).await;
                (seq, record, outcome)
            });
        }

        // Reorder buffer: results arrive in completion order, output must be
        // in input order. Contiguous sequence numbers are routed as soon as
        // they become available, so the buffer never holds more than the
        // concurrency window and output files grow as the batch runs.
        let mut ordered: BTreeMap<u64, (Record, RecordOutcome)> = BTreeMap::new();
        let mut next_seq = 0u64;
        let mut succeeded = 0u64;
        let mut failed = 0u64;
        while let Some(joined) = workers.join_next().await {
            let (seq, record, outcome) = match joined {
                Ok(result) => result,
                Err(e) => {
                    let _ = partitions.finish();
                    return Err(PipelineError::Worker(e.to_string()));
                }
            };
            match outcome {
                Ok(outcome) => {
                    ordered.insert(seq, (record, outcome));
                }
                Err(e) => {
                    // Oracle-level failures are fatal configuration errors,
                    // never a per-record verdict.
                    workers.abort_all();
                    let _ = partitions.finish();
                    return Err(e.into());
                }
            }
            while let Some((record, outcome)) = ordered.remove(&next_seq) {
                let written = match &outcome {
                    None => partitions.route_success(&record),
                    Some(errors) => partitions.route_failure(&record, errors),
                };
                if let Err(e) = written {
                    workers.abort_all();
                    let _ = partitions.finish();
                    return Err(e.into());
                }
                match outcome {
                    None => succeeded += 1,
                    Some(_) => failed += 1,
                }
                next_seq += 1;
            }
        }

        let streams = partitions.finish()?;

        Ok(BatchSummary {
            processed: succeeded + failed,
            skipped: reader.skipped(),
            succeeded,
            failed,
            streams,
        })
    }
}

/// Stages 2-5 for one record: mock synthesis, wrapping, oracle, remap.
async fn judge_record(
    record: &Record,
    synthesizer: &MockSynthesizer,
    wrapper: &HarnessWrapper,
    oracle: &dyn CompileOracle,
) -> Result<RecordOutcome, OracleError> {
    let resolved = match &record.payload {
        Payload::Direct(example) => ResolvedSnippet::plain(example.completion.clone()),
        Payload::Template(template) => {
            synthesizer.synthesize(&template.completion_template, &template.vars_needed)
        }
    };
    let program = wrapper.wrap(&resolved);
    debug!(
        seq = record.seq,
        prepended = program.prepended_lines,
        "compiling synthesized program"
    );
    match oracle.compile(&program).await? {
        Verdict::Success => Ok(None),
        Verdict::Failure(diagnostics) => {
            let errors = remap_diagnostics(&diagnostics, program.prepended_lines)
                .iter()
                .map(|d| d.format())
                .collect();
            Ok(Some(errors))
        }
    }
}
