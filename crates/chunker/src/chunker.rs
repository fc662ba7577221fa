use crate::config::ChunkerConfig;
use crate::error::Result;
use crate::normalizer::normalize;
use crate::types::Chunk;

/// Main chunker interface: overlapping word windows over normalized text
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting configurations whose window never advances
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Every window over the whitespace tokens of `text`, before filtering.
    ///
    /// Windows start at token 0 and advance by `stride` until the start reaches
    /// the token count, so `N` tokens yield `ceil(N / stride)` windows.
    #[must_use]
    pub fn windows(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let size = self.config.chunk_size_words;
        let stride = self.config.stride();

        let mut windows = Vec::with_capacity(words.len().div_ceil(stride));
        let mut start = 0;
        while start < words.len() {
            let end = (start + size).min(words.len());
            windows.push(words[start..end].join(" "));
            start += stride;
        }
        windows
    }

    /// Windows that survive the minimum-length filter, in window order
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        let windows = self.windows(text);
        let total = windows.len();
        let kept: Vec<String> = windows
            .into_iter()
            .filter(|window| window.split_whitespace().count() > self.config.min_words)
            .collect();

        if kept.len() < total {
            log::debug!(
                "Discarded {} of {} windows with <= {} words",
                total - kept.len(),
                total,
                self.config.min_words
            );
        }
        kept
    }

    /// Normalize raw document text and turn it into numbered chunks.
    ///
    /// Sequence indices are assigned after filtering, contiguous from 0.
    #[must_use]
    pub fn chunk_document(&self, source_label: &str, raw_text: &str) -> Vec<Chunk> {
        let normalized = normalize(raw_text);
        let chunks: Vec<Chunk> = self
            .split(&normalized)
            .into_iter()
            .enumerate()
            .map(|(idx, text)| Chunk::new(source_label, idx, text))
            .collect();

        log::debug!(
            "Chunked '{}' into {} chunks (size={}, overlap={})",
            source_label,
            chunks.len(),
            self.config.chunk_size_words,
            self.config.overlap_words
        );
        chunks
    }
}
