//! Deterministic offline providers for tests and smoke runs.

use async_trait::async_trait;
use docqa_answer::CompletionProvider;
use docqa_vector_store::{Embedding, EmbeddingProvider, ProviderInfo};

pub const STUB_MODEL_ID: &str = "stub-hash";

/// Hash-seeded unit vectors: same text, same vector; no model download
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn initialize(&self) -> anyhow::Result<ProviderInfo> {
        Ok(ProviderInfo {
            model: STUB_MODEL_ID.to_string(),
            dimension: self.dimension,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>> {
        Ok(texts
            .iter()
            .map(|text| stub_embed(text, self.dimension))
            .collect())
    }
}

/// Completion that reports what it was given instead of generating anything
#[derive(Debug, Clone, Copy, Default)]
pub struct StubCompleter;

#[async_trait]
impl CompletionProvider for StubCompleter {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let sources = prompt.matches("\n[Source ").count();
        let question = prompt
            .rsplit_once("Question: ")
            .map(|(_, rest)| rest.trim_end_matches("Answer:").trim())
            .unwrap_or_default();
        Ok(format!(
            "[stub] {sources} context block(s) for question: {question}"
        ))
    }
}

fn stub_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let mantissa = high >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vec);
    vec
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
