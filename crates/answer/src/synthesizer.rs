use crate::error::{AnswerError, Result};
use crate::prompt::{build_context_block, build_prompt, source_label, DEFAULT_INSTRUCTIONS};
use async_trait::async_trait;
use docqa_vector_store::{text_preview, RetrievalResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Black-box text generation capability
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Grapheme length of the preview attached to each source
    pub preview_chars: usize,

    /// Role instructions placed at the top of the prompt
    pub instructions: String,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            preview_chars: 200,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

/// Attribution for one retrieved chunk, in ranked order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// `Source N` label as it appears in the prompt
    pub label: String,
    pub chunk_id: usize,
    pub sequence_index: usize,
    pub source_label: String,
    pub score: f32,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Builds a grounded prompt from ranked chunks and asks the completion provider once
pub struct AnswerSynthesizer {
    completer: Arc<dyn CompletionProvider>,
    config: SynthesizerConfig,
}

impl AnswerSynthesizer {
    pub fn new(completer: Arc<dyn CompletionProvider>, config: SynthesizerConfig) -> Self {
        Self { completer, config }
    }

    #[must_use]
    pub const fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Prompt that `synthesize` would send for these inputs
    #[must_use]
    pub fn prompt_for(&self, query: &str, retrieved: &[RetrievalResult<'_>]) -> String {
        build_prompt(&self.config.instructions, &build_context_block(retrieved), query)
    }

    /// Ask the provider and attach one source per retrieved chunk.
    ///
    /// Sources are structural: they list what was retrieved, whether or not the
    /// answer text cites them. An empty `retrieved` still calls the provider.
    pub async fn synthesize(&self, query: &str, retrieved: &[RetrievalResult<'_>]) -> Result<Answer> {
        let prompt = self.prompt_for(query, retrieved);
        log::debug!(
            "Requesting completion ({} sources, {} prompt chars)",
            retrieved.len(),
            prompt.len()
        );

        let answer = self
            .completer
            .complete(&prompt)
            .await
            .map_err(|e| AnswerError::provider(&e))?;

        let sources = retrieved
            .iter()
            .enumerate()
            .map(|(rank, result)| SourceRef {
                label: source_label(rank),
                chunk_id: result.entry.id,
                sequence_index: result.entry.chunk.sequence_index,
                source_label: result.entry.chunk.source_label.clone(),
                score: result.score,
                preview: text_preview(&result.entry.chunk.text, self.config.preview_chars),
            })
            .collect();

        Ok(Answer {
            answer: answer.trim().to_string(),
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::NO_CONTEXT_PLACEHOLDER;
    use docqa_vector_store::{Chunk, IndexedChunk};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCompleter {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl CompletionProvider for RecordingCompleter {
        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                anyhow::bail!("rate limited");
            }
            Ok("  It is blue [Source 1].\n".to_string())
        }
    }

    fn entry(id: usize, text: &str) -> IndexedChunk {
        IndexedChunk {
            id,
            chunk: Chunk::new("sky.txt", id, text),
            embedding: vec![1.0],
            word_count: 0,
            char_count: 0,
            created_at_ms: 0,
            preview: String::new(),
        }
    }

    #[tokio::test]
    async fn attaches_sources_in_rank_order() {
        let completer = Arc::new(RecordingCompleter::default());
        let synthesizer = AnswerSynthesizer::new(
            completer.clone(),
            SynthesizerConfig {
                preview_chars: 5,
                ..Default::default()
            },
        );
        let first = entry(2, "The sky is blue today.");
        let second = entry(0, "Clouds are white.");
        let retrieved = [
            RetrievalResult {
                entry: &first,
                score: 0.9,
            },
            RetrievalResult {
                entry: &second,
                score: 0.4,
            },
        ];

        let answer = synthesizer.synthesize("What colour is the sky?", &retrieved).await.unwrap();

        assert_eq!(answer.answer, "It is blue [Source 1].");
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(
            answer.sources[1],
            SourceRef {
                label: "Source 2".to_string(),
                chunk_id: 0,
                sequence_index: 0,
                source_label: "sky.txt".to_string(),
                score: 0.4,
                preview: "Cloud…".to_string(),
            }
        );
        assert_eq!(answer.sources[0].chunk_id, 2);

        let prompts = completer.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("[Source 2] (score: 0.400)\nClouds are white."));
        assert!(prompts[0].contains("Question: What colour is the sky?"));
    }

    #[tokio::test]
    async fn empty_retrieval_still_calls_provider() {
        let completer = Arc::new(RecordingCompleter::default());
        let synthesizer = AnswerSynthesizer::new(completer.clone(), SynthesizerConfig::default());

        let answer = synthesizer.synthesize("Anything?", &[]).await.unwrap();

        assert!(answer.sources.is_empty());
        let prompts = completer.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(NO_CONTEXT_PLACEHOLDER));
    }

    #[tokio::test]
    async fn provider_failure_is_wrapped() {
        let completer = Arc::new(RecordingCompleter {
            fail: true,
            ..Default::default()
        });
        let synthesizer = AnswerSynthesizer::new(completer.clone(), SynthesizerConfig::default());

        let err = synthesizer.synthesize("q", &[]).await.unwrap_err();
        assert!(matches!(err, AnswerError::Provider(ref msg) if msg.contains("rate limited")));
        assert_eq!(completer.prompts.lock().unwrap().len(), 1);
    }
}
