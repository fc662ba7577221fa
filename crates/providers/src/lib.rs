//! # docqa Providers
//!
//! Concrete adapters behind the embedding and completion capabilities:
//! OpenAI-compatible HTTP clients and deterministic offline stubs.

mod openai;
mod stub;

pub use openai::{OpenAiCompleter, OpenAiEmbedder, OpenAiSettings};
pub use stub::{StubCompleter, StubEmbedder, STUB_MODEL_ID};
