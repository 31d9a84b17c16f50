//! End-to-end pipeline tests over a scripted oracle.
//!
//! The oracle trait seam replaces the real toolchain: the scripted oracle
//! rejects programs containing known-bad markers and positions its
//! diagnostic on the offending program line, which lets these tests verify
//! remapping without invoking a compiler.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use corpus_forge::error::OracleError;
use corpus_forge::harness::{HarnessConfig, HarnessWrapper, SynthesizedProgram, WrapPolicy};
use corpus_forge::mock::{MockSynthesizer, UNMAPPED_SENTINEL};
use corpus_forge::oracle::{CompileOracle, Diagnostic, Verdict};
use corpus_forge::partition::OutputPartitions;
use corpus_forge::pipeline::{BatchSummary, ValidationPipeline};
use corpus_forge::record::{RecordKind, RecordReader};

/// Rejects any program containing one of the bad markers, reporting the
/// 1-based program line of the first offending occurrence.
struct ScriptedOracle {
    bad_markers: Vec<&'static str>,
}

impl ScriptedOracle {
    fn rejecting(markers: &[&'static str]) -> Self {
        Self {
            bad_markers: markers.to_vec(),
        }
    }
}

#[async_trait]
impl CompileOracle for ScriptedOracle {
    async fn compile(&self, program: &SynthesizedProgram) -> Result<Verdict, OracleError> {
        for marker in &self.bad_markers {
            if let Some(idx) = program
                .text
                .lines()
                .position(|line| line.contains(marker))
            {
                return Ok(Verdict::Failure(vec![Diagnostic::new(
                    idx as i64 + 1,
                    "CS0103",
                    format!("invalid expression near '{}'", marker),
                )]));
            }
        }
        Ok(Verdict::Success)
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    success: PathBuf,
    failed: PathBuf,
    cleaned_success: PathBuf,
    cleaned_failed: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = |name: &str| dir.path().join(format!("{}.jsonl", name));
        Self {
            success: path("success"),
            failed: path("failed"),
            cleaned_success: path("cleaned_success"),
            cleaned_failed: path("cleaned_failed"),
            _dir: dir,
        }
    }

    fn direct_partitions(&self) -> OutputPartitions {
        OutputPartitions::with_cleaned(
            &self.success,
            &self.failed,
            &self.cleaned_success,
            &self.cleaned_failed,
        )
        .unwrap()
    }

    fn template_partitions(&self) -> OutputPartitions {
        OutputPartitions::raw_only(&self.success, &self.failed).unwrap()
    }
}

fn pipeline(oracle: ScriptedOracle, policy: WrapPolicy) -> ValidationPipeline {
    ValidationPipeline::new(
        Arc::new(oracle),
        MockSynthesizer::standard(),
        HarnessWrapper::new(HarnessConfig {
            wrap_policy: policy,
            ..HarnessConfig::default()
        }),
        2,
    )
}

async fn run_direct(input: &str, fixture: &Fixture, oracle: ScriptedOracle) -> BatchSummary {
    let mut reader = RecordReader::new(Cursor::new(input.to_string()), RecordKind::Direct);
    pipeline(oracle, WrapPolicy::AlwaysWrap)
        .run(
            Path::new("input.jsonl"),
            &mut reader,
            fixture.direct_partitions(),
        )
        .await
        .unwrap()
}

async fn run_templates(input: &str, fixture: &Fixture, oracle: ScriptedOracle) -> BatchSummary {
    let mut reader = RecordReader::new(Cursor::new(input.to_string()), RecordKind::Template);
    pipeline(oracle, WrapPolicy::AlwaysWrap)
        .run(
            Path::new("input.jsonl"),
            &mut reader,
            fixture.template_partitions(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_valid_direct_record_routed_to_success_verbatim() {
    let fixture = Fixture::new();
    let input = r#"{"prompt":"add a wall","completion":"var w = 1;"}"#;
    let summary = run_direct(input, &fixture, ScriptedOracle::rejecting(&[])).await;

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
    let success = fs::read_to_string(&fixture.success).unwrap();
    assert_eq!(success.trim(), input);
    assert_eq!(fs::read_to_string(&fixture.cleaned_success).unwrap(), success);
    assert!(fs::read_to_string(&fixture.failed).unwrap().is_empty());
    assert!(fs::read_to_string(&fixture.cleaned_failed).unwrap().is_empty());
}

#[tokio::test]
async fn test_failing_record_carries_errors_in_both_failure_streams() {
    let fixture = Fixture::new();
    let input = r#"{"prompt":"x","completion":"this is not code"}"#;
    let summary = run_direct(
        input,
        &fixture,
        ScriptedOracle::rejecting(&["this is not code"]),
    )
    .await;

    assert_eq!(summary.failed, 1);
    let raw: serde_json::Value =
        serde_json::from_str(fs::read_to_string(&fixture.failed).unwrap().trim()).unwrap();
    let errors = raw["errors"].as_array().unwrap();
    assert!(!errors.is_empty());

    let cleaned: serde_json::Value =
        serde_json::from_str(fs::read_to_string(&fixture.cleaned_failed).unwrap().trim())
            .unwrap();
    assert_eq!(cleaned["completion"], "this is not code");
    assert_eq!(cleaned["errors"], raw["errors"]);
}

#[tokio::test]
async fn test_counting_placeholder_compiles_and_succeeds() {
    let fixture = Fixture::new();
    let input = r#"{"prompt_template":"make {count} walls","completion_template":"var n = {count};","vars_needed":["count"]}"#;
    // Reject anything that still looks like a placeholder; the synthesized
    // declaration keeps the program clean.
    let summary = run_templates(input, &fixture, ScriptedOracle::rejecting(&["{count}"])).await;

    assert_eq!(summary.succeeded, 1);
    assert_eq!(fs::read_to_string(&fixture.success).unwrap().trim(), input);
}

#[tokio::test]
async fn test_unmapped_placeholder_fails_on_the_sentinel_line() {
    let fixture = Fixture::new();
    let input = r#"{"prompt_template":"p","completion_template":"var v = {frobnicator};","vars_needed":["frobnicator"]}"#;
    let summary = run_templates(
        input,
        &fixture,
        ScriptedOracle::rejecting(&[UNMAPPED_SENTINEL]),
    )
    .await;

    // The batch completes; the record is a routed failure.
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 0);
    let value: serde_json::Value =
        serde_json::from_str(fs::read_to_string(&fixture.failed).unwrap().trim()).unwrap();
    let error = value["errors"][0].as_str().unwrap();
    // The sentinel sits on snippet line 1 and the diagnostic names it.
    assert!(error.starts_with("1:CS0103"), "unexpected error: {}", error);
    assert!(error.contains("UNMAPPED_VARIABLE"));
}

#[tokio::test]
async fn test_idempotence_reruns_are_byte_identical() {
    let input = r#"{"prompt":"a","completion":"var w = 1;"}
{"prompt":"b","completion":"this is not code"}
garbage line
{"prompt":"c","completion":"var h = 2;"}
"#;
    let first = Fixture::new();
    run_direct(input, &first, ScriptedOracle::rejecting(&["this is not code"])).await;
    let second = Fixture::new();
    run_direct(input, &second, ScriptedOracle::rejecting(&["this is not code"])).await;

    for (a, b) in [
        (&first.success, &second.success),
        (&first.failed, &second.failed),
        (&first.cleaned_success, &second.cleaned_success),
        (&first.cleaned_failed, &second.cleaned_failed),
    ] {
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}

#[tokio::test]
async fn test_cleaned_success_records_revalidate_cleanly() {
    let input = r#"{"prompt":"a","completion":"var w = 1;"}
{"prompt":"b","completion":"this is not code"}
{"prompt":"c","completion":"var h = 2;"}
"#;
    let first = Fixture::new();
    run_direct(input, &first, ScriptedOracle::rejecting(&["this is not code"])).await;

    // Re-wrapping the cleaned-success stream under the same policy must
    // reproduce an all-success batch.
    let cleaned = fs::read_to_string(&first.cleaned_success).unwrap();
    let second = Fixture::new();
    let summary = run_direct(
        &cleaned,
        &second,
        ScriptedOracle::rejecting(&["this is not code"]),
    )
    .await;
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn test_every_record_ends_in_exactly_one_bucket() {
    let input = r#"{"prompt":"a","completion":"ok one"}
{"prompt":"b","completion":"this is not code"}
{"bad json
{"prompt":"c","completion":"ok two"}

{"prompt":"d","completion":"this is not code"}
"#;
    let fixture = Fixture::new();
    let summary = run_direct(
        input,
        &fixture,
        ScriptedOracle::rejecting(&["this is not code"]),
    )
    .await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.processed, 4);

    let successes = fs::read_to_string(&fixture.success).unwrap();
    let failures = fs::read_to_string(&fixture.failed).unwrap();
    assert_eq!(successes.lines().count(), 2);
    assert_eq!(failures.lines().count(), 2);
    // No prompt appears in both raw streams.
    for line in successes.lines() {
        let prompt = serde_json::from_str::<serde_json::Value>(line).unwrap()["prompt"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(!failures.contains(&format!("\"{}\"", prompt)));
    }
}
