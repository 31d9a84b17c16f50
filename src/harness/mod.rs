//! Program harness synthesis.
//!
//! A snippet on its own is not compilable; the wrapper embeds it into a
//! fixed skeleton (import preamble, namespace, one entry method taking the
//! two ambient handles the target API expects), optionally inside a
//! transactional envelope, with a finalize block appended. The exact count
//! of boilerplate lines prepended is reported so diagnostics can be mapped
//! back onto snippet coordinates.

mod wrapper;

pub use wrapper::{
    AmbientHandle, HarnessConfig, HarnessWrapper, SynthesizedProgram, WrapPolicy,
};
