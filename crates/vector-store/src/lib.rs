//! # docqa Vector Store
//!
//! Embedding access, in-memory vector storage and similarity ranking for a
//! single document session.
//!
//! ## Architecture
//!
//! ```text
//! Chunk[]
//!     │
//!     ├──> EmbeddingGateway (lazy provider init, batches of 32, validation)
//!     │      └─> Embedding[dimension]
//!     │
//!     ├──> VectorStore (append-only, insertion ordered, clear)
//!     │
//!     └──> rank() cosine full scan, stable top-K
//! ```
//!
//! ## Example
//!
//! ```rust
//! use docqa_chunker::Chunk;
//! use docqa_vector_store::VectorStore;
//!
//! let mut store = VectorStore::new();
//! store.append(Chunk::new("doc", 0, "x axis"), vec![1.0, 0.0]).unwrap();
//! store.append(Chunk::new("doc", 1, "y axis"), vec![0.0, 1.0]).unwrap();
//! store.append(Chunk::new("doc", 2, "diagonal"), vec![1.0, 1.0]).unwrap();
//!
//! let results = store.search(&[1.0, 0.0], 2).unwrap();
//! assert_eq!(results[0].entry.chunk.text, "x axis");
//! assert_eq!(results[1].entry.chunk.text, "diagonal");
//! ```

mod embeddings;
mod error;
mod ranker;
mod store;
mod types;

pub use embeddings::{
    validate_embedding, EmbeddingGateway, EmbeddingProvider, GatewayConfig, ProviderInfo,
};
pub use error::{Result, VectorStoreError};
pub use ranker::{cosine_similarity, rank, require_results, RankerConfig};
pub use store::VectorStore;
pub use types::{text_preview, Embedding, IndexedChunk, RetrievalResult};

// Re-export chunk type for convenience
pub use docqa_chunker::Chunk;
