use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::source::DocumentSource;
use docqa_answer::{Answer, AnswerSynthesizer, CompletionProvider};
use docqa_chunker::{normalize, Chunker};
use docqa_vector_store::{
    require_results, EmbeddingGateway, EmbeddingProvider, RankerConfig, RetrievalResult,
    VectorStore,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of indexing one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub document: String,
    pub chunks: usize,
    pub words: usize,
    pub dimension: Option<usize>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub document: Option<String>,
    pub chunks: usize,
    pub words: usize,
    pub dimension: Option<usize>,
}

/// One document, its index and the providers that answer questions about it.
///
/// Single writer: ingestion takes `&mut self`, queries take `&self`.
/// Concurrent independent sessions each own their own instance.
pub struct DocumentSession {
    chunker: Chunker,
    gateway: EmbeddingGateway,
    store: VectorStore,
    ranker: RankerConfig,
    synthesizer: AnswerSynthesizer,
    source: Arc<dyn DocumentSource>,
    document: Option<String>,
}

impl DocumentSession {
    pub fn new(
        config: &SessionConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        completer: Arc<dyn CompletionProvider>,
        source: Arc<dyn DocumentSource>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chunker: Chunker::new(config.chunking)?,
            gateway: EmbeddingGateway::new(embedder, config.embedding.gateway())?,
            store: VectorStore::new(),
            ranker: config.retrieval,
            synthesizer: AnswerSynthesizer::new(completer, config.synthesis.clone()),
            source,
            document: None,
        })
    }

    /// Build providers from the configured modes
    pub fn from_config(config: &SessionConfig, source: Arc<dyn DocumentSource>) -> Result<Self> {
        let embedder = config.embedding.build_provider()?;
        let completer = config.completion.build_provider()?;
        Self::new(config, embedder, completer, source)
    }

    /// Replace the current document with `document_ref` from the document source
    pub async fn ingest(&mut self, document_ref: &str) -> Result<IngestReport> {
        self.clear();
        let text = self
            .source
            .document_text(document_ref)
            .await
            .map_err(|e| SessionError::Document {
                document: document_ref.to_string(),
                message: format!("{e:#}"),
            })?;
        self.index_text(document_ref, &text).await
    }

    /// Replace the current document with already extracted `text`
    pub async fn ingest_text(&mut self, source_label: &str, text: &str) -> Result<IngestReport> {
        self.clear();
        self.index_text(source_label, text).await
    }

    // Embeds everything before touching the store, so a failure leaves it empty.
    async fn index_text(&mut self, source_label: &str, text: &str) -> Result<IngestReport> {
        let started = Instant::now();
        let chunks = self.chunker.chunk_document(source_label, text);
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.gateway.embed_batch(&texts).await?;

        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            if let Err(err) = self.store.append(chunk, embedding) {
                self.store.clear();
                return Err(err.into());
            }
        }
        self.document = Some(source_label.to_string());

        let report = IngestReport {
            document: source_label.to_string(),
            chunks: self.store.len(),
            words: self.store.total_words(),
            dimension: self.store.dimension(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        log::info!(
            "Indexed '{}': {} chunks, {} words in {} ms",
            report.document,
            report.chunks,
            report.words,
            report.elapsed_ms
        );
        Ok(report)
    }

    /// Top-K chunks for `query` by cosine similarity
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievalResult<'_>>> {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        let query_vector = self.gateway.embed(&normalized).await?;
        let results = self.store.search(&query_vector, self.ranker.top_k)?;
        log::debug!("Retrieved {} chunks for '{}'", results.len(), normalized);
        Ok(results)
    }

    /// Like [`retrieve`](Self::retrieve), but an empty index is an error
    pub async fn retrieve_required(&self, query: &str) -> Result<Vec<RetrievalResult<'_>>> {
        let results = self.retrieve(query).await?;
        Ok(require_results(results)?)
    }

    /// Retrieve, then synthesize a grounded answer with sources
    pub async fn ask(&self, query: &str) -> Result<Answer> {
        let retrieved = self.retrieve(query).await?;
        let answer = self.synthesizer.synthesize(query.trim(), &retrieved).await?;
        log::info!("Answered with {} sources", answer.sources.len());
        Ok(answer)
    }

    /// Forget the current document and its index
    pub fn clear(&mut self) {
        self.store.clear();
        self.document = None;
    }

    #[must_use]
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    #[must_use]
    pub const fn store(&self) -> &VectorStore {
        &self.store
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            document: self.document.clone(),
            chunks: self.store.len(),
            words: self.store.total_words(),
            dimension: self.store.dimension().or_else(|| self.gateway.dimension()),
        }
    }
}
