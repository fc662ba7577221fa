//! # docqa Session
//!
//! Wires chunking, embedding, ranking and answer synthesis into a
//! single-document question answering session.
//!
//! ## Flow
//!
//! ```text
//! ingest:  DocumentSource -> normalize -> chunk -> embed (batched) -> VectorStore
//! ask:     query -> normalize -> embed -> rank top-K -> synthesize -> Answer
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use docqa_session::{DocumentSession, FileDocumentSource, SessionConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SessionConfig::load(None)?;
//!     let source = Arc::new(FileDocumentSource::new("."));
//!     let mut session = DocumentSession::from_config(&config, source)?;
//!
//!     session.ingest("handbook.txt").await?;
//!     let answer = session.ask("How many vacation days do I get?").await?;
//!     println!("{}", answer.answer);
//!     for source in answer.sources {
//!         println!("  [{}] chunk {} ({:.3})", source.label, source.chunk_id, source.score);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod session;
mod source;

pub use config::{CompletionSettings, EmbeddingSettings, ProviderMode, SessionConfig};
pub use error::{ErrorKind, Result, SessionError};
pub use session::{DocumentSession, IngestReport, SessionStats};
pub use source::{DocumentSource, FileDocumentSource, MemoryDocumentSource};

pub use docqa_answer::{Answer, CompletionProvider, SourceRef};
pub use docqa_vector_store::{EmbeddingProvider, ProviderInfo, RetrievalResult};
