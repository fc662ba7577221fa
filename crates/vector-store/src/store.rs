use crate::embeddings::validate_embedding;
use crate::error::{Result, VectorStoreError};
use crate::ranker::rank;
use crate::types::{text_preview, Embedding, IndexedChunk, RetrievalResult};
use docqa_chunker::Chunk;
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_PREVIEW_GRAPHEMES: usize = 200;

/// Naive full-scan vector store for a single document session.
///
/// Append-only; `clear` is the only removal. Entries keep insertion order,
/// which the ranker relies on for tie-breaking. Swapping in an ANN index
/// would keep the `append`/`all` contract.
#[derive(Debug, Default)]
pub struct VectorStore {
    entries: Vec<IndexedChunk>,
    configured_dimension: Option<usize>,
    dimension: Option<usize>,
    next_id: usize,
}

impl VectorStore {
    /// Store whose dimension is fixed by the first appended embedding
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that only accepts embeddings of `dimension` values
    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            configured_dimension: Some(dimension),
            dimension: Some(dimension),
            ..Self::default()
        }
    }

    /// Pair `chunk` with `embedding` and assign the next id
    pub fn append(&mut self, chunk: Chunk, embedding: Embedding) -> Result<&IndexedChunk> {
        if embedding.is_empty() {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension.unwrap_or(1),
                actual: 0,
            });
        }
        let expected = self.dimension.unwrap_or(embedding.len());
        validate_embedding(&embedding, expected).map_err(|source| {
            VectorStoreError::InvalidEmbedding {
                context: format!("chunk '{}'", chunk.id()),
                source: Box::new(source),
            }
        })?;
        self.dimension = Some(expected);

        let entry = IndexedChunk {
            id: self.next_id,
            word_count: chunk.word_count(),
            char_count: chunk.char_count(),
            created_at_ms: now_epoch_ms(),
            preview: text_preview(&chunk.text, DEFAULT_PREVIEW_GRAPHEMES),
            chunk,
            embedding,
        };
        self.next_id += 1;
        self.entries.push(entry);

        Ok(&self.entries[self.entries.len() - 1])
    }

    /// All entries in insertion order
    #[must_use]
    pub fn all(&self) -> &[IndexedChunk] {
        &self.entries
    }

    /// Drop every entry and reset the id counter
    pub fn clear(&mut self) {
        log::debug!("Clearing vector store ({} entries)", self.entries.len());
        self.entries.clear();
        self.next_id = 0;
        self.dimension = self.configured_dimension;
    }

    /// Rank every entry against `query` and keep the best `top_k`
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<RetrievalResult<'_>>> {
        rank(query, &self.entries, top_k)
    }

    #[must_use]
    pub fn get(&self, id: usize) -> Option<&IndexedChunk> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding length accepted by this store, if known yet
    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Sum of word counts over all entries
    #[must_use]
    pub fn total_words(&self) -> usize {
        self.entries.iter().map(|entry| entry.word_count).sum()
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
