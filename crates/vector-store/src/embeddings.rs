use crate::error::{Result, VectorStoreError};
use crate::types::{text_preview, Embedding};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// What a provider reports once its model/connection is ready
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub model: String,
    pub dimension: usize,
}

/// Black-box text embedding capability.
///
/// Implementations may batch, call a local model or a remote API; the gateway
/// only relies on `embed_batch` returning one vector per input, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Load the model or open the connection and report the output dimension.
    /// Called at most once per gateway.
    async fn initialize(&self) -> anyhow::Result<ProviderInfo>;

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Maximum texts per provider call
    pub batch_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { batch_size: 32 }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(VectorStoreError::invalid_config("batch_size must be > 0"));
        }
        Ok(())
    }
}

/// Validated, batched access to an [`EmbeddingProvider`].
///
/// The provider is initialized lazily on first use; later calls reuse the
/// recorded [`ProviderInfo`], and explicit re-initialization is a no-op.
/// Batches are sent sequentially and the first failure aborts the rest.
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    config: GatewayConfig,
    info: OnceCell<ProviderInfo>,
}

impl EmbeddingGateway {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            config,
            info: OnceCell::new(),
        })
    }

    /// Initialize the provider once and return its info
    pub async fn initialize(&self) -> Result<&ProviderInfo> {
        self.info
            .get_or_try_init(|| async {
                log::debug!("Initializing embedding provider");
                let info = self
                    .provider
                    .initialize()
                    .await
                    .map_err(|e| VectorStoreError::provider("provider initialization", &e))?;
                if info.dimension == 0 {
                    return Err(VectorStoreError::invalid_config(format!(
                        "embedding model '{}' reported dimension 0",
                        info.model
                    )));
                }
                log::info!(
                    "Embedding provider ready: model={} dimension={}",
                    info.model,
                    info.dimension
                );
                Ok(info)
            })
            .await
    }

    /// Dimension of every embedding this gateway returns, once initialized
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.info.get().map(|info| info.dimension)
    }

    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub async fn embed(&self, text: &str) -> Result<Embedding> {
        let dimension = self.initialize().await?.dimension;
        let context = format!("text '{}'", text_preview(text, 40));
        let mut embeddings = self.call_provider(&[text.to_string()], dimension, &context).await?;
        embeddings.pop().ok_or_else(|| VectorStoreError::Provider {
            context,
            message: "empty embedding result".to_string(),
        })
    }

    /// Embed `texts` in order, one embedding per text
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let dimension = self.initialize().await?.dimension;
        let batch_count = texts.len().div_ceil(self.config.batch_size);
        let mut out = Vec::with_capacity(texts.len());

        for (batch_idx, batch) in texts.chunks(self.config.batch_size).enumerate() {
            let first = batch_idx * self.config.batch_size;
            let context = format!(
                "batch {}/{} (items {}..{})",
                batch_idx + 1,
                batch_count,
                first,
                first + batch.len()
            );
            log::debug!("Embedding {context}");
            let embeddings = self.call_provider(batch, dimension, &context).await?;
            out.extend(embeddings);
        }

        Ok(out)
    }

    async fn call_provider(
        &self,
        batch: &[String],
        dimension: usize,
        context: &str,
    ) -> Result<Vec<Embedding>> {
        let embeddings = self
            .provider
            .embed_batch(batch)
            .await
            .map_err(|e| VectorStoreError::provider(context, &e))?;

        if embeddings.len() != batch.len() {
            return Err(VectorStoreError::Provider {
                context: context.to_string(),
                message: format!(
                    "provider returned {} embeddings for {} inputs",
                    embeddings.len(),
                    batch.len()
                ),
            });
        }

        for (offset, embedding) in embeddings.iter().enumerate() {
            validate_embedding(embedding, dimension).map_err(|source| {
                VectorStoreError::InvalidEmbedding {
                    context: format!("{context}, item {offset}"),
                    source: Box::new(source),
                }
            })?;
        }

        Ok(embeddings)
    }
}

/// Check length and finiteness of one embedding
pub fn validate_embedding(embedding: &[f32], expected_dimension: usize) -> Result<()> {
    if embedding.len() != expected_dimension {
        return Err(VectorStoreError::InvalidDimension {
            expected: expected_dimension,
            actual: embedding.len(),
        });
    }
    if let Some((position, value)) = embedding
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(VectorStoreError::NonFiniteValue {
            position,
            value: *value,
        });
    }
    Ok(())
}
