//! Mock value synthesis for templated completions.
//!
//! Template records carry `{name}` placeholders that must become concrete
//! code before the compiler can judge them. The rule table maps names to
//! literal values; the synthesizer performs the substitution and emits the
//! local declarations the harness prepends.

mod rules;
mod synthesizer;

pub use rules::{ClassValue, MockRule, MockRuleSet, Resolution};
pub use synthesizer::{MockSynthesizer, ResolvedSnippet, RESIDUAL_LITERAL, UNMAPPED_SENTINEL};
