use crate::error::{Result, SessionError};
use docqa_answer::{CompletionProvider, SynthesizerConfig};
use docqa_chunker::ChunkerConfig;
use docqa_providers::{
    OpenAiCompleter, OpenAiEmbedder, OpenAiSettings, StubCompleter, StubEmbedder,
};
use docqa_vector_store::{EmbeddingProvider, GatewayConfig, RankerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_STUB_DIMENSION: usize = 384;

/// Which adapter backs a provider capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// Deterministic offline stub
    Stub,
    /// OpenAI-compatible HTTP endpoint
    #[serde(rename = "openai")]
    OpenAi,
}

impl FromStr for ProviderMode {
    type Err = SessionError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stub" => Ok(Self::Stub),
            "openai" => Ok(Self::OpenAi),
            other => Err(SessionError::config(format!(
                "unsupported provider mode '{other}' (expected 'stub' or 'openai')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub mode: ProviderMode,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    /// Output dimension; probed from the endpoint when unset (stub: 384)
    pub dimension: Option<usize>,
    pub batch_size: usize,
    pub max_retries: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            mode: ProviderMode::OpenAi,
            model: "text-embedding-3-small".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            dimension: None,
            batch_size: GatewayConfig::default().batch_size,
            max_retries: 3,
            timeout_secs: 60,
        }
    }
}

impl EmbeddingSettings {
    #[must_use]
    pub const fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            batch_size: self.batch_size,
        }
    }

    pub fn build_provider(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        match self.mode {
            ProviderMode::Stub => Ok(Arc::new(StubEmbedder::new(
                self.dimension.unwrap_or(DEFAULT_STUB_DIMENSION),
            ))),
            ProviderMode::OpenAi => {
                let settings = OpenAiSettings {
                    base_url: self.base_url.clone(),
                    api_key: self.api_key.clone(),
                    model: self.model.clone(),
                    timeout: Duration::from_secs(self.timeout_secs),
                };
                let embedder = OpenAiEmbedder::new(&settings, self.dimension, self.max_retries)
                    .map_err(|e| SessionError::config(format!("embedding provider: {e:#}")))?;
                Ok(Arc::new(embedder))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub mode: ProviderMode,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            mode: ProviderMode::OpenAi,
            model: "gpt-4o-mini".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            temperature: 0.2,
            max_tokens: 512,
            timeout_secs: 120,
        }
    }
}

impl CompletionSettings {
    pub fn build_provider(&self) -> Result<Arc<dyn CompletionProvider>> {
        match self.mode {
            ProviderMode::Stub => Ok(Arc::new(StubCompleter)),
            ProviderMode::OpenAi => {
                let settings = OpenAiSettings {
                    base_url: self.base_url.clone(),
                    api_key: self.api_key.clone(),
                    model: self.model.clone(),
                    timeout: Duration::from_secs(self.timeout_secs),
                };
                let completer = OpenAiCompleter::new(&settings, self.temperature, self.max_tokens)
                    .map_err(|e| SessionError::config(format!("completion provider: {e:#}")))?;
                Ok(Arc::new(completer))
            }
        }
    }
}

/// Full session configuration: TOML file, then `DOCQA_*` environment, then caller overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub chunking: ChunkerConfig,
    pub embedding: EmbeddingSettings,
    pub retrieval: RankerConfig,
    pub synthesis: SynthesizerConfig,
    pub completion: CompletionSettings,
}

impl SessionConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| SessionError::config(format!("invalid TOML: {e}")))
    }

    /// Read `path` if given, then apply the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                log::debug!("Loading config from {}", path.display());
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    SessionError::config(format!("failed to read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `DOCQA_*` overrides read through `lookup`.
    ///
    /// `DOCQA_API_KEY` and then `OPENAI_API_KEY` fill any API key the more
    /// specific variables leave unset.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(mode) = get("DOCQA_EMBEDDING_MODE") {
            self.embedding.mode = mode.parse()?;
        }
        if let Some(model) = get("DOCQA_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(url) = get("DOCQA_EMBEDDING_BASE_URL") {
            self.embedding.base_url = url;
        }
        if let Some(raw) = get("DOCQA_EMBEDDING_DIMENSION") {
            let dimension = raw.trim().parse::<usize>().map_err(|_| {
                SessionError::config(format!("DOCQA_EMBEDDING_DIMENSION must be an integer, got '{raw}'"))
            })?;
            self.embedding.dimension = Some(dimension);
        }
        if let Some(key) = get("DOCQA_EMBEDDING_API_KEY") {
            self.embedding.api_key = Some(key);
        }

        if let Some(mode) = get("DOCQA_COMPLETION_MODE") {
            self.completion.mode = mode.parse()?;
        }
        if let Some(model) = get("DOCQA_COMPLETION_MODEL") {
            self.completion.model = model;
        }
        if let Some(url) = get("DOCQA_COMPLETION_BASE_URL") {
            self.completion.base_url = url;
        }
        if let Some(key) = get("DOCQA_COMPLETION_API_KEY") {
            self.completion.api_key = Some(key);
        }

        let shared_key = get("DOCQA_API_KEY").or_else(|| get("OPENAI_API_KEY"));
        if let Some(key) = shared_key {
            self.embedding.api_key.get_or_insert_with(|| key.clone());
            self.completion.api_key.get_or_insert(key);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.retrieval.validate()?;
        self.embedding.gateway().validate()?;
        if self.embedding.dimension == Some(0) {
            return Err(SessionError::config("embedding dimension must be > 0"));
        }
        Ok(())
    }
}
