//! Input record types for the validation pipeline.
//!
//! Two record shapes exist, matching the two corpus variants: direct
//! (instruction, code) pairs and templated pairs whose completion still
//! contains `{name}` placeholders. One JSON object per input line.

mod reader;

pub use reader::{RecordKind, RecordReader};

use serde::{Deserialize, Serialize};

/// A ready-to-compile (instruction, code) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectExample {
    /// Natural-language instruction.
    pub prompt: String,
    /// Candidate code fragment.
    pub completion: String,
}

/// A templated pair whose completion contains `{name}` placeholders that
/// must be mock-resolved before compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateExample {
    /// Instruction template.
    pub prompt_template: String,
    /// Completion template with `{name}` holes.
    pub completion_template: String,
    /// Declared placeholder names appearing in the templates.
    #[serde(default)]
    pub vars_needed: Vec<String>,
}

/// The payload of one parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Direct(DirectExample),
    Template(TemplateExample),
}

/// One input record, tagged with its position in the batch.
///
/// `seq` is dense over *parsed* records (skipped lines do not consume a
/// number) and drives the reorder buffer that keeps output streams in input
/// order. `raw_line` retains the original input text; the template variant
/// replays it verbatim on success.
#[derive(Debug, Clone)]
pub struct Record {
    pub seq: u64,
    pub raw_line: String,
    pub payload: Payload,
}

impl Record {
    /// The instruction text (template text for template records).
    pub fn prompt(&self) -> &str {
        match &self.payload {
            Payload::Direct(d) => &d.prompt,
            Payload::Template(t) => &t.prompt_template,
        }
    }

    /// The completion text (template text for template records).
    pub fn completion(&self) -> &str {
        match &self.payload {
            Payload::Direct(d) => &d.completion,
            Payload::Template(t) => &t.completion_template,
        }
    }
}
