//! CLI command definitions for corpus-forge.
//!
//! Two subcommands, one per corpus variant: `validate` routes direct
//! (prompt, completion) pairs through the compiler oracle into four output
//! streams; `validate-templates` mock-resolves templated pairs first and
//! routes them into two. Paths are positional; everything else comes from
//! `FORGE_*` environment variables.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::harness::{HarnessConfig, HarnessWrapper};
use crate::mock::MockSynthesizer;
use crate::oracle::ExternalCompilerOracle;
use crate::partition::OutputPartitions;
use crate::pipeline::{PipelineConfig, ValidationPipeline};
use crate::record::{RecordKind, RecordReader};

/// Compile-validated corpus partitioner.
#[derive(Parser)]
#[command(name = "corpus-forge")]
#[command(about = "Partition (instruction, code) pairs by compilability")]
#[command(version)]
#[command(
    long_about = "corpus-forge embeds each candidate code pair into a compilable harness,\n\
consults the configured compiler as a correctness oracle, and routes the record\n\
into success or failure output streams.\n\n\
Example usage:\n  corpus-forge validate input.jsonl success.jsonl failed.jsonl cleaned_success.jsonl cleaned_failed.jsonl"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Validate direct (prompt, completion) records.
    Validate(ValidateArgs),

    /// Validate templated records, mock-resolving placeholders first.
    #[command(name = "validate-templates")]
    ValidateTemplates(ValidateTemplatesArgs),
}

/// Arguments for `corpus-forge validate`.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Input JSONL file of {prompt, completion} records.
    pub input: PathBuf,
    /// Output stream for records that compiled (original form).
    pub success: PathBuf,
    /// Output stream for records that failed ({prompt, errors}).
    pub failed: PathBuf,
    /// Cleaned success stream ({prompt, completion} only).
    pub cleaned_success: PathBuf,
    /// Cleaned failure stream ({prompt, completion, errors}).
    pub cleaned_failed: PathBuf,
}

/// Arguments for `corpus-forge validate-templates`.
#[derive(Parser, Debug)]
pub struct ValidateTemplatesArgs {
    /// Input JSONL file of template records.
    pub input: PathBuf,
    /// Output stream for templates whose mocked form compiled (input line
    /// replayed verbatim).
    pub success: PathBuf,
    /// Output stream for templates that failed
    /// ({prompt, completion, errors}).
    pub failed: PathBuf,
}

/// Parses CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parses CLI arguments and runs the selected command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Runs the selected command with pre-parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Validate(args) => validate(args).await,
        Commands::ValidateTemplates(args) => validate_templates(args).await,
    }
}

async fn validate(args: ValidateArgs) -> anyhow::Result<()> {
    let config = PipelineConfig::from_env().context("loading pipeline configuration")?;
    let partitions = OutputPartitions::with_cleaned(
        &args.success,
        &args.failed,
        &args.cleaned_success,
        &args.cleaned_failed,
    )?;
    run_batch(config, RecordKind::Direct, &args.input, partitions).await
}

async fn validate_templates(args: ValidateTemplatesArgs) -> anyhow::Result<()> {
    let config = PipelineConfig::from_env().context("loading pipeline configuration")?;
    let partitions = OutputPartitions::raw_only(&args.success, &args.failed)?;
    run_batch(config, RecordKind::Template, &args.input, partitions).await
}

async fn run_batch(
    config: PipelineConfig,
    kind: RecordKind,
    input: &Path,
    partitions: OutputPartitions,
) -> anyhow::Result<()> {
    info!(input = %input.display(), "starting validation batch");

    // Oracle setup fails fast on a missing reference library, before any
    // record is read.
    let oracle = ExternalCompilerOracle::new(config.oracle.clone())
        .context("setting up the compilation oracle")?;
    let wrapper = HarnessWrapper::new(HarnessConfig {
        wrap_policy: config.wrap_policy,
        ..HarnessConfig::default()
    });
    let mut reader = RecordReader::from_path(input, kind)
        .with_context(|| format!("opening input '{}'", input.display()))?;

    let pipeline = ValidationPipeline::new(
        Arc::new(oracle),
        MockSynthesizer::standard(),
        wrapper,
        config.max_concurrent,
    );
    let summary = pipeline.run(input, &mut reader, partitions).await?;
    summary.log();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_all_five_paths() {
        let result = Cli::try_parse_from([
            "corpus-forge",
            "validate",
            "input.jsonl",
            "success.jsonl",
            "failed.jsonl",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_parses_with_five_paths() {
        let cli = Cli::try_parse_from([
            "corpus-forge",
            "validate",
            "input.jsonl",
            "success.jsonl",
            "failed.jsonl",
            "cleaned_success.jsonl",
            "cleaned_failed.jsonl",
        ])
        .unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.cleaned_failed, PathBuf::from("cleaned_failed.jsonl"));
            }
            _ => panic!("expected validate subcommand"),
        }
    }

    #[test]
    fn test_validate_templates_parses_with_three_paths() {
        let cli = Cli::try_parse_from([
            "corpus-forge",
            "validate-templates",
            "templates.jsonl",
            "success.jsonl",
            "failed.jsonl",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::ValidateTemplates(_)));
    }
}
