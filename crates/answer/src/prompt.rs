use docqa_vector_store::RetrievalResult;

/// Context used when retrieval produced nothing; the model still gets asked
pub const NO_CONTEXT_PLACEHOLDER: &str = "No relevant context was found in the document.";

pub const DEFAULT_INSTRUCTIONS: &str = "\
You answer questions about a document using only the context below.
- Answer only from the provided context.
- If the context is insufficient, say that you don't know.
- Cite the sources you rely on as [Source N].
- Be concise.";

/// Label used both in the context block and in source attributions (1-based)
#[must_use]
pub fn source_label(rank: usize) -> String {
    format!("Source {}", rank + 1)
}

/// Ranked chunks as `[Source i] (score: s)` blocks separated by blank lines
#[must_use]
pub fn build_context_block(retrieved: &[RetrievalResult<'_>]) -> String {
    if retrieved.is_empty() {
        return NO_CONTEXT_PLACEHOLDER.to_string();
    }

    retrieved
        .iter()
        .enumerate()
        .map(|(rank, result)| {
            format!(
                "[{}] (score: {:.3})\n{}",
                source_label(rank),
                result.score,
                result.entry.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[must_use]
pub fn build_prompt(instructions: &str, context_block: &str, query: &str) -> String {
    format!("{instructions}\n\nContext:\n{context_block}\n\nQuestion: {query}\n\nAnswer:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_vector_store::{Chunk, IndexedChunk};
    use pretty_assertions::assert_eq;

    fn entry(id: usize, text: &str) -> IndexedChunk {
        IndexedChunk {
            id,
            chunk: Chunk::new("guide.txt", id, text),
            embedding: vec![1.0],
            word_count: 0,
            char_count: 0,
            created_at_ms: 0,
            preview: text.to_string(),
        }
    }

    #[test]
    fn context_block_lists_sources_in_rank_order() {
        let a = entry(4, "Rust has ownership.");
        let b = entry(1, "Borrowing is checked.");
        let retrieved = vec![
            RetrievalResult {
                entry: &a,
                score: 0.91234,
            },
            RetrievalResult {
                entry: &b,
                score: 0.5,
            },
        ];

        assert_eq!(
            build_context_block(&retrieved),
            "[Source 1] (score: 0.912)\nRust has ownership.\n\n[Source 2] (score: 0.500)\nBorrowing is checked."
        );
    }

    #[test]
    fn empty_context_uses_placeholder() {
        assert_eq!(build_context_block(&[]), NO_CONTEXT_PLACEHOLDER);
    }

    #[test]
    fn prompt_contains_instructions_context_and_query() {
        let prompt = build_prompt(DEFAULT_INSTRUCTIONS, "[Source 1] (score: 1.000)\nctx", "What is it?");
        assert!(prompt.starts_with("You answer questions"));
        assert!(prompt.contains("Context:\n[Source 1]"));
        assert!(prompt.contains("Question: What is it?"));
        assert!(prompt.ends_with("Answer:"));
    }
}
