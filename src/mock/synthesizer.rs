//! Placeholder substitution over completion templates.
//!
//! A single pass over `{name}` tokens with a resolver callback. Repeated
//! `str::replace` calls would be order-dependent when one placeholder name is
//! a substring of another; matching whole tokens sidesteps that entirely.

use std::collections::HashSet;

use regex::{Captures, Regex};

use super::rules::{MockRuleSet, Resolution};

/// Literal substituted for declared placeholders no rule can resolve. Kept
/// distinctive so compile failures caused by a mocking gap are separable in
/// diagnostics from genuine snippet defects.
pub const UNMAPPED_SENTINEL: &str = "\"UNMAPPED_VARIABLE\"";

/// Literal substituted for residual tokens outside the declared placeholder
/// set (templates whose `vars_needed` list is incomplete).
pub const RESIDUAL_LITERAL: &str = "0.0";

/// A template with every placeholder resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSnippet {
    /// Code text with zero `{name}`-shaped tokens remaining.
    pub code: String,
    /// Local declarations to prepend, one statement per entry, in first-use
    /// order.
    pub declarations: Vec<String>,
}

impl ResolvedSnippet {
    /// A snippet that needed no resolution (the direct-example path).
    pub fn plain(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            declarations: Vec::new(),
        }
    }
}

/// Resolves template placeholders against an injected rule table.
#[derive(Debug)]
pub struct MockSynthesizer {
    rules: MockRuleSet,
    token_re: Regex,
}

impl MockSynthesizer {
    /// Creates a synthesizer over the given rule table.
    pub fn new(rules: MockRuleSet) -> Self {
        Self {
            rules,
            token_re: Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid token pattern"),
        }
    }

    /// Creates a synthesizer over the standard production table.
    pub fn standard() -> Self {
        Self::new(MockRuleSet::standard())
    }

    /// Substitutes every placeholder in `template`.
    ///
    /// Declared names resolve through the rule table; non-enum resolutions
    /// become a `var` declaration plus a bare-name substitution. Declared
    /// names with no rule become the sentinel literal. Tokens outside the
    /// declared set are swept to a safe numeric literal. Interpolation `$`
    /// prefixes are stripped so braces in the output are plain text.
    pub fn synthesize(&self, template: &str, vars_needed: &[String]) -> ResolvedSnippet {
        let declared: HashSet<&str> = vars_needed.iter().map(String::as_str).collect();
        let mut declarations: Vec<String> = Vec::new();
        let mut declared_names: HashSet<String> = HashSet::new();

        let code = self.token_re.replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            if !declared.contains(name) {
                return RESIDUAL_LITERAL.to_string();
            }
            match self.rules.resolve(name) {
                Some(Resolution::EnumConstant(constant)) => constant,
                Some(Resolution::Literal(literal)) => {
                    if declared_names.insert(name.to_string()) {
                        declarations.push(format!("var {} = {};", name, literal));
                    }
                    name.to_string()
                }
                Some(Resolution::Omit) => String::new(),
                None => UNMAPPED_SENTINEL.to_string(),
            }
        });

        ResolvedSnippet {
            code: code.replace('$', ""),
            declarations,
        }
    }
}
