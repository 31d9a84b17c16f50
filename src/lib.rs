//! corpus-forge: compile-validated corpus curation for code-generation
//! training data.
//!
//! Each (instruction, code) record is embedded into a minimal executable
//! harness, template placeholders are filled with synthetic values, the
//! result is compiled against a fixed reference set, and the record is
//! routed into a valid or invalid dataset partition by the verdict.

pub mod cli;
pub mod error;
pub mod harness;
pub mod mock;
pub mod oracle;
pub mod partition;
pub mod pipeline;
pub mod record;

// Re-export commonly used error types
pub use error::{ConfigError, OracleError, PipelineError, SinkError};
