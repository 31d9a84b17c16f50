//! Snippet-to-program wrapping.

use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mock::ResolvedSnippet;

/// Transaction-envelope policy for incoming snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapPolicy {
    /// Wrap every snippet, regardless of its own content. For corpora known
    /// to contain bare snippets only.
    AlwaysWrap,
    /// Pass a snippet through untouched when it already opens a transaction
    /// itself, trusting it to commit. For mixed corpora.
    DetectAndWrap,
}

impl FromStr for WrapPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(Self::AlwaysWrap),
            "detect" => Ok(Self::DetectAndWrap),
            other => Err(ConfigError::InvalidValue {
                key: "wrap_policy".to_string(),
                message: format!("'{}' is not one of: always, detect", other),
            }),
        }
    }
}

/// One of the two ambient handles the entry method receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientHandle {
    /// Declared type, e.g. `UIDocument`.
    pub type_name: String,
    /// Parameter name, e.g. `uidoc`.
    pub name: String,
}

impl AmbientHandle {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

/// Skeleton configuration for synthesized programs.
///
/// Defaults mirror the harness the corpus was originally validated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Import preamble, one namespace per entry.
    pub imports: Vec<String>,
    /// Namespace the generated class lives in.
    pub namespace: String,
    /// Generated class name.
    pub class_name: String,
    /// Entry method name.
    pub entry_method: String,
    /// First ambient handle (UI context).
    pub ui_handle: AmbientHandle,
    /// Second ambient handle (document/model context).
    pub doc_handle: AmbientHandle,
    /// Label for the transaction opened around bare snippets.
    pub transaction_label: String,
    /// Label for the finalize transaction.
    pub finalize_label: String,
    /// Transaction-envelope policy.
    pub wrap_policy: WrapPolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            imports: [
                "Autodesk.Revit.DB",
                "Autodesk.Revit.DB.Structure",
                "Autodesk.Revit.DB.Plumbing",
                "Autodesk.Revit.DB.Electrical",
                "Autodesk.Revit.DB.Mechanical",
                "Autodesk.Revit.DB.Architecture",
                "Autodesk.Revit.UI",
                "Autodesk.Revit.UI.Selection",
                "System",
                "System.Collections.Generic",
                "System.Linq",
                "System.IO",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            namespace: "DynamicCode".to_string(),
            class_name: "Executor".to_string(),
            entry_method: "Run".to_string(),
            ui_handle: AmbientHandle::new("UIDocument", "uidoc"),
            doc_handle: AmbientHandle::new("Document", "doc"),
            transaction_label: "AI Generated Action".to_string(),
            finalize_label: "Regenerate View".to_string(),
            wrap_policy: WrapPolicy::AlwaysWrap,
        }
    }
}

/// A full compilable program plus the boilerplate offset of its snippet.
///
/// Ephemeral: lives only for the duration of one compile call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedProgram {
    /// Complete program text.
    pub text: String,
    /// Exact number of lines before the first snippet line. Diagnostics at
    /// a raw line greater than this fall inside the snippet.
    pub prepended_lines: usize,
}

/// Embeds resolved snippets into the fixed program skeleton.
#[derive(Debug)]
pub struct HarnessWrapper {
    config: HarnessConfig,
}

impl HarnessWrapper {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Wraps a resolved snippet into a complete program.
    pub fn wrap(&self, snippet: &ResolvedSnippet) -> SynthesizedProgram {
        let code = self.sanitize(&snippet.code);
        let needs_envelope = match self.config.wrap_policy {
            WrapPolicy::AlwaysWrap => true,
            WrapPolicy::DetectAndWrap => !detects_open_transaction(&code),
        };

        let c = &self.config;
        let mut lines: Vec<String> = Vec::new();
        for import in &c.imports {
            lines.push(format!("using {};", import));
        }
        lines.push(String::new());
        lines.push(format!("namespace {}", c.namespace));
        lines.push("{".to_string());
        lines.push(format!("    public class {}", c.class_name));
        lines.push("    {".to_string());
        lines.push(format!(
            "        public void {}({} {}, {} {})",
            c.entry_method,
            c.ui_handle.type_name,
            c.ui_handle.name,
            c.doc_handle.type_name,
            c.doc_handle.name,
        ));
        lines.push("        {".to_string());
        for decl in &snippet.declarations {
            lines.push(format!("            {}", decl));
        }
        if needs_envelope {
            lines.push(format!(
                "            using (Transaction tx = new Transaction({}, \"{}\"))",
                c.doc_handle.name, c.transaction_label,
            ));
            lines.push("            {".to_string());
            lines.push("                tx.Start();".to_string());
        }

        let prepended_lines = lines.len();
        for line in code.lines() {
            lines.push(line.to_string());
        }

        if needs_envelope {
            lines.push("                tx.Commit();".to_string());
            lines.push("            }".to_string());
        }
        lines.push(String::new());
        lines.push(format!(
            "            using (Transaction regenTx = new Transaction({}, \"{}\"))",
            c.doc_handle.name, c.finalize_label,
        ));
        lines.push("            {".to_string());
        lines.push("                regenTx.Start();".to_string());
        lines.push(format!("                {}.Regenerate();", c.doc_handle.name));
        lines.push("                regenTx.Commit();".to_string());
        lines.push("            }".to_string());
        lines.push("        }".to_string());
        lines.push("    }".to_string());
        lines.push("}".to_string());

        SynthesizedProgram {
            text: lines.join("\n") + "\n",
            prepended_lines,
        }
    }

    /// Strips interpolation prefixes and renames redeclarations of either
    /// ambient handle so the snippet cannot collide with the entry-method
    /// parameters.
    fn sanitize(&self, code: &str) -> String {
        let code = code.replace('$', "");
        let code = guard_handle(&code, &self.config.ui_handle);
        guard_handle(&code, &self.config.doc_handle)
    }
}

/// Renames a redeclaration of `handle` (and its subsequent uses) to a local
/// alias. Whole-word matching; `doc.` inside `uidoc.` must not match.
fn guard_handle(code: &str, handle: &AmbientHandle) -> String {
    let decl_re = Regex::new(&format!(
        r"\b(?:{}|var)\s+{}\s*=",
        regex::escape(&handle.type_name),
        regex::escape(&handle.name),
    ))
    .expect("valid handle declaration pattern");
    if !decl_re.is_match(code) {
        return code.to_string();
    }

    let alias = local_alias(&handle.name);
    let renamed = decl_re
        .replace_all(code, format!("{} {} =", handle.type_name, alias))
        .into_owned();
    let use_re = Regex::new(&format!(r"\b{}\.", regex::escape(&handle.name)))
        .expect("valid handle use pattern");
    use_re
        .replace_all(&renamed, format!("{}.", alias))
        .into_owned()
}

fn local_alias(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("local{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "local".to_string(),
    }
}

/// Structural check for a snippet that opens its own transaction.
///
/// Line comments are stripped before matching, so a snippet that merely
/// mentions transactions in a comment still gets the envelope.
fn detects_open_transaction(code: &str) -> bool {
    for line in code.lines() {
        let text = match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if text.starts_with("using (Transaction") || text.contains("tx.Start()") {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ResolvedSnippet;

    fn wrapper(policy: WrapPolicy) -> HarnessWrapper {
        HarnessWrapper::new(HarnessConfig {
            wrap_policy: policy,
            ..HarnessConfig::default()
        })
    }

    #[test]
    fn test_always_wrap_adds_envelope() {
        let program = wrapper(WrapPolicy::AlwaysWrap).wrap(&ResolvedSnippet::plain("var w = 1;"));
        assert!(program.text.contains("tx.Start();"));
        assert!(program.text.contains("tx.Commit();"));
        assert!(program.text.contains("doc.Regenerate();"));
    }

    #[test]
    fn test_prepended_lines_points_at_first_snippet_line() {
        let snippet = ResolvedSnippet::plain("var w = 1;\nvar h = 2;");
        let program = wrapper(WrapPolicy::AlwaysWrap).wrap(&snippet);
        let lines: Vec<&str> = program.text.lines().collect();
        assert_eq!(lines[program.prepended_lines], "var w = 1;");
        assert_eq!(lines[program.prepended_lines + 1], "var h = 2;");
    }

    #[test]
    fn test_declarations_prepended_and_counted() {
        let snippet = ResolvedSnippet {
            code: "var n = count;".to_string(),
            declarations: vec!["var count = 5;".to_string()],
        };
        let program = wrapper(WrapPolicy::AlwaysWrap).wrap(&snippet);
        let lines: Vec<&str> = program.text.lines().collect();
        assert_eq!(lines[program.prepended_lines], "var n = count;");
        let decl_idx = lines
            .iter()
            .position(|l| l.trim() == "var count = 5;")
            .expect("declaration present");
        assert!(decl_idx < program.prepended_lines);
    }

    #[test]
    fn test_detect_policy_passes_through_self_transacting_snippet() {
        let snippet = ResolvedSnippet::plain(
            "using (Transaction tx = new Transaction(doc, \"mine\"))\n{\n    tx.Start();\n    tx.Commit();\n}",
        );
        let program = wrapper(WrapPolicy::DetectAndWrap).wrap(&snippet);
        // Only the snippet's own transaction, no second envelope.
        assert_eq!(program.text.matches("tx.Start();").count(), 1);
        assert!(!program.text.contains("\"AI Generated Action\""));
        // The finalize block is still appended.
        assert!(program.text.contains("doc.Regenerate();"));
    }

    #[test]
    fn test_detect_policy_ignores_transaction_mentions_in_comments() {
        let snippet =
            ResolvedSnippet::plain("// wrap this in a Transaction with tx.Start() later\nvar w = 1;");
        let program = wrapper(WrapPolicy::DetectAndWrap).wrap(&snippet);
        assert!(program.text.contains("\"AI Generated Action\""));
    }

    #[test]
    fn test_collision_guard_renames_ui_handle_redeclaration() {
        let snippet = ResolvedSnippet::plain(
            "UIDocument uidoc = commandData.Application.ActiveUIDocument;\nuidoc.RefreshActiveView();",
        );
        let program = wrapper(WrapPolicy::AlwaysWrap).wrap(&snippet);
        assert!(program.text.contains("UIDocument localUidoc ="));
        assert!(program.text.contains("localUidoc.RefreshActiveView();"));
        assert!(!program.text.contains("\nUIDocument uidoc ="));
    }

    #[test]
    fn test_collision_guard_leaves_clean_snippets_alone() {
        let snippet = ResolvedSnippet::plain("var ids = doc.Delete(elementId);");
        let program = wrapper(WrapPolicy::AlwaysWrap).wrap(&snippet);
        assert!(program.text.contains("var ids = doc.Delete(elementId);"));
        assert!(!program.text.contains("localDoc"));
    }

    #[test]
    fn test_doc_guard_does_not_touch_uidoc_uses() {
        let snippet = ResolvedSnippet::plain(
            "Document doc = uidoc.Document;\nvar ids = doc.Delete(elementId);",
        );
        let program = wrapper(WrapPolicy::AlwaysWrap).wrap(&snippet);
        assert!(program.text.contains("Document localDoc = uidoc.Document;"));
        assert!(program.text.contains("var ids = localDoc.Delete(elementId);"));
    }

    #[test]
    fn test_interpolation_prefix_stripped_from_direct_snippets() {
        let snippet = ResolvedSnippet::plain(r#"TaskDialog.Show("t", $"made {n} walls");"#);
        let program = wrapper(WrapPolicy::AlwaysWrap).wrap(&snippet);
        assert!(!program.text.contains('$'));
    }

    #[test]
    fn test_skeleton_structure() {
        let program = wrapper(WrapPolicy::AlwaysWrap).wrap(&ResolvedSnippet::plain("var w = 1;"));
        assert!(program.text.starts_with("using Autodesk.Revit.DB;\n"));
        assert!(program.text.contains("namespace DynamicCode"));
        assert!(program
            .text
            .contains("public void Run(UIDocument uidoc, Document doc)"));
    }
}
