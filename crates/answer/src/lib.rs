//! # docqa Answer
//!
//! Turns ranked chunks into a grounded prompt, asks a completion provider once
//! and returns the answer with structural source attributions.

mod error;
mod prompt;
mod synthesizer;

pub use error::{AnswerError, Result};
pub use prompt::{
    build_context_block, build_prompt, source_label, DEFAULT_INSTRUCTIONS, NO_CONTEXT_PLACEHOLDER,
};
pub use synthesizer::{Answer, AnswerSynthesizer, CompletionProvider, SourceRef, SynthesizerConfig};
