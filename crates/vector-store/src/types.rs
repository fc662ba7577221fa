use docqa_chunker::Chunk;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Fixed-length vector produced by the embedding provider for one text
pub type Embedding = Vec<f32>;

/// A chunk paired with its embedding, as held by the vector store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedChunk {
    /// Store-assigned id, in append order from 0
    pub id: usize,
    pub chunk: Chunk,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub embedding: Embedding,
    pub word_count: usize,
    pub char_count: usize,
    /// Milliseconds since the Unix epoch when the entry was appended
    pub created_at_ms: u64,
    pub preview: String,
}

/// One stored chunk scored against one query vector
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RetrievalResult<'a> {
    pub entry: &'a IndexedChunk,
    pub score: f32,
}

/// First `max_graphemes` grapheme clusters of `text`, with an ellipsis when cut
#[must_use]
pub fn text_preview(text: &str, max_graphemes: usize) -> String {
    let mut graphemes = text.grapheme_indices(true);
    match graphemes.nth(max_graphemes) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
