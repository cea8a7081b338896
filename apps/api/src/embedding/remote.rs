/// Remote embedder: calls a sentence-transformer inference server
/// (text-embeddings-inference style `/embed` endpoint).
///
/// Transient failures (429, 5xx, transport) are retried here with
/// exponential backoff. Anything else is surfaced as-is; the matching engine
/// never retries on its own.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::{Embedding, EmbeddingError, EmbeddingProvider};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: [&'a str; 1],
    truncate: bool,
}

#[derive(Clone)]
pub struct RemoteEmbedder {
    client: Client,
    url: String,
    api_key: Option<String>,
    dimension: usize,
    retry_base: Duration,
}

impl RemoteEmbedder {
    pub fn new(url: String, api_key: Option<String>, dimension: usize) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            url,
            api_key,
            dimension,
            retry_base: Duration::from_millis(500),
        })
    }

    #[cfg(test)]
    fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    async fn request(&self, text: &str) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let body = EmbedRequest {
            inputs: [text],
            truncate: true,
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_base * (1 << (attempt - 1));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.url).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, message);
                last_error = Some(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let raw = response.bytes().await?;
            return Ok(serde_json::from_slice(&raw)?);
        }

        Err(last_error.unwrap_or(EmbeddingError::EmptyResponse))
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbedder {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Ok(Embedding::zeros(self.dimension));
        }

        let vector = self
            .request(text)
            .await?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResponse)?;

        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        debug!(chars = text.len(), "remote embedding computed");
        Ok(Embedding::new(vector))
    }
}
