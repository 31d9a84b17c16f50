//! External compiler invocation.
//!
//! Each compile call is stateless: the program text is written into a fresh
//! temporary directory, the configured compiler is invoked against it with
//! the startup-resolved reference list, and its diagnostics are parsed from
//! the captured output. No intermediate artifacts survive the call.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{CompileOracle, Diagnostic, Verdict, OPAQUE_FAILURE_CODE, TIMEOUT_CODE};
use crate::error::OracleError;
use crate::harness::SynthesizedProgram;

/// Configuration for the external compiler oracle.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Compiler binary to invoke (`csc`, `mcs`, or an absolute path).
    pub compiler: String,
    /// Base runtime references, passed through by name for the compiler to
    /// resolve itself.
    pub base_references: Vec<String>,
    /// Target-API libraries, resolved to existing files at startup.
    pub target_api_libraries: Vec<PathBuf>,
    /// Per-record compile timeout; expiry becomes a synthetic failure.
    pub compile_timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            compiler: "csc".to_string(),
            base_references: vec![
                "System.dll".to_string(),
                "System.Core.dll".to_string(),
            ],
            target_api_libraries: vec![
                PathBuf::from(r"C:\Program Files\Autodesk\Revit 2025\RevitAPI.dll"),
                PathBuf::from(r"C:\Program Files\Autodesk\Revit 2025\RevitAPIUI.dll"),
            ],
            compile_timeout: Duration::from_secs(60),
        }
    }
}

/// The reference list handed to every compile call, resolved once at
/// startup. Read-only afterwards, safe to share across workers.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    arguments: Vec<String>,
}

impl ReferenceSet {
    /// Resolves the configured references, failing fast on any target-API
    /// library that does not exist on disk.
    pub fn resolve(config: &OracleConfig) -> Result<Self, OracleError> {
        let mut arguments: Vec<String> = config.base_references.clone();
        for lib in &config.target_api_libraries {
            if !lib.is_file() {
                return Err(OracleError::MissingReference(lib.clone()));
            }
            arguments.push(lib.display().to_string());
        }
        Ok(Self { arguments })
    }

    /// The reference arguments in invocation order.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

/// [`CompileOracle`] backed by an external compiler process.
pub struct ExternalCompilerOracle {
    config: OracleConfig,
    references: ReferenceSet,
    diagnostic_re: Regex,
}

impl ExternalCompilerOracle {
    /// Builds the oracle, resolving the reference set. Fails before any
    /// record is processed if a target-API library is missing.
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        let references = ReferenceSet::resolve(&config)?;
        Ok(Self {
            config,
            references,
            diagnostic_re: Regex::new(r"\((\d+),\d+\):\s*error\s+([A-Za-z]+\d+):\s*(.+)")
                .expect("valid diagnostic pattern"),
        })
    }

    /// Parses ordered error diagnostics out of compiler output.
    fn parse_diagnostics(&self, output: &str) -> Vec<Diagnostic> {
        self.diagnostic_re
            .captures_iter(output)
            .map(|caps| {
                Diagnostic::new(
                    caps[1].parse().unwrap_or(0),
                    caps[2].to_string(),
                    caps[3].trim().to_string(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl CompileOracle for ExternalCompilerOracle {
    async fn compile(&self, program: &SynthesizedProgram) -> Result<Verdict, OracleError> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("snippet.cs");
        let artifact = dir.path().join("snippet.dll");
        tokio::fs::write(&source, &program.text).await?;

        let mut cmd = Command::new(&self.config.compiler);
        cmd.arg("/nologo")
            .arg("/target:library")
            .arg(format!("/out:{}", artifact.display()));
        for reference in self.references.arguments() {
            cmd.arg(format!("/reference:{}", reference));
        }
        cmd.arg(&source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = match timeout(self.config.compile_timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(OracleError::CompilerLaunch {
                    compiler: self.config.compiler.clone(),
                    source,
                });
            }
            Err(_) => {
                return Ok(Verdict::Failure(vec![Diagnostic::new(
                    0,
                    TIMEOUT_CODE,
                    format!(
                        "compiler did not finish within {}s",
                        self.config.compile_timeout.as_secs()
                    ),
                )]));
            }
        };

        if output.status.success() {
            return Ok(Verdict::Success);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{}\n{}", stdout, stderr);
        let mut diagnostics = self.parse_diagnostics(&combined);
        if diagnostics.is_empty() {
            // Non-zero exit without a single parseable error line.
            let detail = combined.trim();
            diagnostics.push(Diagnostic::new(
                0,
                OPAQUE_FAILURE_CODE,
                if detail.is_empty() {
                    format!("compiler exited with status {}", output.status)
                } else {
                    detail.to_string()
                },
            ));
        }
        debug!(
            diagnostics = diagnostics.len(),
            "compilation failed for synthesized program"
        );
        Ok(Verdict::Failure(diagnostics))
    }
}
