//! Diagnostic line remapping.
//!
//! Raw diagnostics are positioned in the synthesized program; subtracting
//! the harness's prepended line count recovers snippet-relative positions.
//! A non-positive result means the error lies inside injected boilerplate;
//! that is preserved (raw line, explicit note) rather than clamped, since a
//! miscalibrated harness is useful signal for that record.

use super::Diagnostic;

/// A diagnostic repositioned relative to the original snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemappedDiagnostic {
    /// Snippet-relative line, or the raw program line for boilerplate hits.
    pub line: i64,
    pub code: String,
    pub message: String,
    /// True when the raw line fell inside harness boilerplate.
    pub in_boilerplate: bool,
}

impl RemappedDiagnostic {
    /// Formats as `<line>:<code> <message>` for the failure streams.
    pub fn format(&self) -> String {
        if self.in_boilerplate {
            format!(
                "{}:{} {} (in harness boilerplate)",
                self.line, self.code, self.message
            )
        } else {
            format!("{}:{} {}", self.line, self.code, self.message)
        }
    }
}

/// Offsets each diagnostic by the wrapper's prepended line count.
pub fn remap_diagnostics(
    diagnostics: &[Diagnostic],
    prepended_lines: usize,
) -> Vec<RemappedDiagnostic> {
    diagnostics
        .iter()
        .map(|d| {
            let shifted = d.line - prepended_lines as i64;
            if shifted > 0 {
                RemappedDiagnostic {
                    line: shifted,
                    code: d.code.clone(),
                    message: d.message.clone(),
                    in_boilerplate: false,
                }
            } else {
                RemappedDiagnostic {
                    line: d.line,
                    code: d.code.clone(),
                    message: d.message.clone(),
                    in_boilerplate: true,
                }
            }
        })
        .collect()
}
