//! The compilation oracle.
//!
//! Answers one question per record: does the synthesized program compile
//! against the declared reference set? A failing compile is an expected,
//! first-class outcome ([`Verdict::Failure`]); only an inability to consult
//! the compiler at all surfaces as an error. The trait seam lets tests swap
//! the real toolchain for a scripted oracle.

mod compiler;
mod remap;

pub use compiler::{ExternalCompilerOracle, OracleConfig, ReferenceSet};
pub use remap::{remap_diagnostics, RemappedDiagnostic};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::harness::SynthesizedProgram;

/// Diagnostic code used for the synthetic timeout failure.
pub const TIMEOUT_CODE: &str = "FORGE-TIMEOUT";

/// Diagnostic code used when the compiler fails without parseable output.
pub const OPAQUE_FAILURE_CODE: &str = "FORGE-COMPILER";

/// One compiler diagnostic, positioned in raw (pre-remap) program lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line in the synthesized program; 0 for synthetic diagnostics.
    pub line: i64,
    /// Compiler error code, e.g. `CS0103`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: i64, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The oracle's answer for one record, computed once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure(Vec<Diagnostic>),
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }
}

/// Compiles synthesized programs against a fixed reference set.
#[async_trait]
pub trait CompileOracle: Send + Sync {
    /// Judges one program. `Err` means the oracle itself is unusable
    /// (missing reference, unlaunchable compiler) and aborts the batch.
    async fn compile(&self, program: &SynthesizedProgram) -> Result<Verdict, OracleError>;
}
