use serde::{Deserialize, Serialize};

/// An immutable slice of a document's normalized text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Originating document (file name or equivalent)
    pub source_label: String,

    /// Position in the filtered chunk sequence (0-based, contiguous)
    pub sequence_index: usize,

    /// Space-joined words of the window
    pub text: String,
}

impl Chunk {
    /// Create a new chunk
    #[must_use]
    pub fn new(source_label: impl Into<String>, sequence_index: usize, text: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
            sequence_index,
            text: text.into(),
        }
    }

    /// Identifier unique within the document's chunk sequence
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}#{}", self.source_label, self.sequence_index)
    }

    /// Number of words in this chunk
    #[must_use]
    pub fn word_count(&self) -> usize {
        crate::normalizer::word_count(&self.text)
    }

    /// Number of characters (not bytes) in this chunk
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_combines_label_and_index() {
        let chunk = Chunk::new("report.pdf", 7, "some words here");
        assert_eq!(chunk.id(), "report.pdf#7");
        assert_eq!(chunk.word_count(), 3);
    }

    #[test]
    fn char_count_is_unicode_aware() {
        let chunk = Chunk::new("doc", 0, "naïve café");
        assert_eq!(chunk.char_count(), 10);
        assert!(chunk.text.len() > 10);
    }
}
