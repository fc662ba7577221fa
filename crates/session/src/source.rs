use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// Supplies the plain text of a document (extraction already done)
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn document_text(&self, document: &str) -> anyhow::Result<String>;
}

/// UTF-8 text files resolved against a root directory
#[derive(Debug, Clone)]
pub struct FileDocumentSource {
    root: PathBuf,
}

impl FileDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSource for FileDocumentSource {
    async fn document_text(&self, document: &str) -> anyhow::Result<String> {
        let path = self.root.join(document);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Documents held in memory, e.g. text already extracted from an upload
#[derive(Debug, Default)]
pub struct MemoryDocumentSource {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryDocumentSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Every write is a single map call, so a poisoned map is still consistent.
    pub fn insert(&self, document: impl Into<String>, text: impl Into<String>) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(document.into(), text.into());
    }

    pub fn remove(&self, document: &str) -> Option<String> {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(document)
    }
}

#[async_trait]
impl DocumentSource for MemoryDocumentSource {
    async fn document_text(&self, document: &str) -> anyhow::Result<String> {
        let text = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(document)
            .cloned();
        text.with_context(|| format!("document '{document}' not found"))
    }
}
