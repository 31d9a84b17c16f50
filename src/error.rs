//! Error types for corpus-forge operations.
//!
//! Defines error types for the major subsystems:
//! - Oracle configuration and reference-library resolution
//! - Compiler invocation
//! - Output sink I/O
//! - Batch pipeline orchestration
//!
//! A failing compilation is *not* an error anywhere in this crate; it is a
//! first-class [`crate::oracle::Verdict`]. The enums here cover conditions
//! that abort a batch.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while setting up or invoking the compilation oracle.
///
/// Every variant is fatal for the batch: it means the oracle itself could not
/// be consulted, which is distinct from the oracle answering "this snippet
/// does not compile".
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Reference library not found: {0}")]
    MissingReference(PathBuf),

    #[error("Failed to launch compiler '{compiler}': {source}")]
    CompilerLaunch {
        compiler: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while writing an output partition.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open sink '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to sink '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that abort a batch run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read input '{path}': {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Worker task failed: {0}")]
    Worker(String),
}
