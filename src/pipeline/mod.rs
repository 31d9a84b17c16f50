//! Batch pipeline orchestration.
//!
//! Composes the reader, mock synthesizer, harness wrapper, compilation
//! oracle, diagnostic remapper, and dataset partitioner into a straight-line
//! per-record flow with a bounded worker pool around the oracle.

mod config;
mod runner;

pub use config::PipelineConfig;
pub use runner::{BatchSummary, ValidationPipeline};
