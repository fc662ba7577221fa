use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for word-window chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Window length in words
    pub chunk_size_words: usize,

    /// Words shared between consecutive windows
    pub overlap_words: usize,

    /// Windows with this many words or fewer are discarded
    pub min_words: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size_words: 500,
            overlap_words: 50,
            min_words: 5,
        }
    }
}

impl ChunkerConfig {
    /// Fixed-size windows with no overlap
    #[must_use]
    pub fn fixed(chunk_size_words: usize) -> Self {
        Self {
            chunk_size_words,
            overlap_words: 0,
            ..Default::default()
        }
    }

    /// Small fixed windows (200 words), for short documents and tight prompts
    #[must_use]
    pub fn small() -> Self {
        Self::fixed(200)
    }

    /// Large fixed windows (1500 words), for big documents on a low embedding budget
    #[must_use]
    pub fn large() -> Self {
        Self::fixed(1500)
    }

    /// Distance the window start advances per step
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.chunk_size_words.saturating_sub(self.overlap_words)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size_words == 0 {
            return Err(ChunkerError::invalid_config("chunk_size_words must be > 0"));
        }

        if self.overlap_words >= self.chunk_size_words {
            return Err(ChunkerError::invalid_config(format!(
                "overlap_words ({}) must be smaller than chunk_size_words ({})",
                self.overlap_words, self.chunk_size_words
            )));
        }

        Ok(())
    }
}
