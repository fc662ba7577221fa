//! # docqa Chunker
//!
//! Whitespace normalization and overlapping word-window chunking for
//! document question answering.
//!
//! ## Pipeline
//!
//! ```text
//! Raw document text
//!     │
//!     ├──> normalize()  collapse whitespace runs, trim
//!     │
//!     ├──> Word windows  size = chunk_size_words,
//!     │                  stride = chunk_size_words - overlap_words
//!     │
//!     ├──> Filter        drop windows with <= min_words words
//!     │
//!     └──> Chunk[]       sequence_index contiguous from 0
//! ```
//!
//! ## Example
//!
//! ```rust
//! use docqa_chunker::{Chunker, ChunkerConfig};
//!
//! let config = ChunkerConfig {
//!     chunk_size_words: 2,
//!     overlap_words: 1,
//!     min_words: 1,
//! };
//! let chunker = Chunker::new(config).unwrap();
//!
//! let chunks = chunker.chunk_document("notes.txt", "alpha  beta\ngamma delta epsilon");
//! // The trailing one-word window "epsilon" falls under min_words.
//! assert_eq!(chunks.len(), 4);
//! assert_eq!(chunks[1].text, "beta gamma");
//! assert_eq!(chunks[3].sequence_index, 3);
//! ```

mod chunker;
mod config;
mod error;
mod normalizer;
mod types;

pub use chunker::Chunker;
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use normalizer::{normalize, word_count};
pub use types::Chunk;
