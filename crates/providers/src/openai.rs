//! Clients for OpenAI-compatible `/embeddings` and `/chat/completions` endpoints.
//!
//! Works against hosted APIs and local servers (llama.cpp, vLLM, Ollama's
//! OpenAI layer) alike; only the base URL and key differ.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use docqa_answer::CompletionProvider;
use docqa_vector_store::{Embedding, EmbeddingProvider, ProviderInfo};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const DIMENSION_PROBE_TEXT: &str = "dimension probe";

/// Connection settings shared by both clients
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

fn build_client(settings: &OpenAiSettings) -> Result<Client> {
    anyhow::ensure!(!settings.model.trim().is_empty(), "missing model name");
    anyhow::ensure!(!settings.base_url.trim().is_empty(), "missing base URL");

    let mut headers = HeaderMap::new();
    if let Some(key) = settings.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        let auth = format!("Bearer {}", key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid API key")?,
        );
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(settings.timeout)
        .default_headers(headers)
        .build()
        .context("failed to build HTTP client")
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Embeddings client with bounded retry on throttling and transient failures
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
    max_retries: usize,
}

impl OpenAiEmbedder {
    /// `dimensions`, when set, is sent with each request and reported as-is;
    /// otherwise the dimension is probed once during initialization.
    pub fn new(settings: &OpenAiSettings, dimensions: Option<usize>, max_retries: usize) -> Result<Self> {
        Ok(Self {
            client: build_client(settings)?,
            endpoint: endpoint(&settings.base_url, "embeddings"),
            model: settings.model.clone(),
            dimensions,
            max_retries,
        })
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Embedding>> {
        let mut attempt = 0usize;
        loop {
            let request = EmbeddingRequest {
                model: &self.model,
                input: inputs,
                dimensions: self.dimensions,
            };
            let response = self.client.post(&self.endpoint).json(&request).send().await;
            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let mut parsed: EmbeddingResponse = resp
                            .json()
                            .await
                            .context("failed to parse embedding response")?;
                        parsed.data.sort_by_key(|entry| entry.index);
                        anyhow::ensure!(
                            parsed.data.len() == inputs.len(),
                            "endpoint returned {} embeddings for {} inputs",
                            parsed.data.len(),
                            inputs.len()
                        );
                        return Ok(parsed
                            .data
                            .into_iter()
                            .map(|entry| entry.embedding.iter().map(json_to_f32).collect())
                            .collect());
                    }

                    let body = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if should_retry(status) && attempt < self.max_retries {
                        attempt += 1;
                        log::warn!("Embedding request returned {status}, retry {attempt}/{}", self.max_retries);
                        tokio::time::sleep(retry_backoff(attempt)).await;
                        continue;
                    }
                    bail!("embeddings request failed ({status}): {body}");
                }
                Err(err) => {
                    if is_retryable_error(&err) && attempt < self.max_retries {
                        attempt += 1;
                        log::warn!("Embedding request error: {err}, retry {attempt}/{}", self.max_retries);
                        tokio::time::sleep(retry_backoff(attempt)).await;
                        continue;
                    }
                    return Err(err).context("failed to call embeddings endpoint");
                }
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn initialize(&self) -> Result<ProviderInfo> {
        let dimension = match self.dimensions {
            Some(dimension) => dimension,
            None => {
                let probe = self
                    .request(&[DIMENSION_PROBE_TEXT.to_string()])
                    .await
                    .context("failed to probe embedding dimension")?;
                probe.first().map(Vec::len).unwrap_or_default()
            }
        };
        Ok(ProviderInfo {
            model: self.model.clone(),
            dimension,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }
}

/// Chat completions client; one attempt per call
#[derive(Clone)]
pub struct OpenAiCompleter {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl OpenAiCompleter {
    pub fn new(settings: &OpenAiSettings, temperature: f32, max_tokens: usize) -> Result<Self> {
        Ok(Self {
            client: build_client(settings)?,
            endpoint: endpoint(&settings.base_url, "chat/completions"),
            model: settings.model.clone(),
            temperature,
            max_tokens,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompleter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .context("failed to call chat completions endpoint")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("chat completions returned {status}: {text}");
        }
        let parsed: ChatResponse = resp
            .json()
            .await
            .context("failed to parse chat completions response")?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("chat completions response had no choices")
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_body() || err.is_request()
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(500 * (1 << capped))
}

/// Non-numeric entries become NaN so the gateway rejects them as invalid values
fn json_to_f32(value: &serde_json::Value) -> f32 {
    value.as_f64().map_or(f32::NAN, |v| v as f32)
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<serde_json::Value>,
    index: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}
