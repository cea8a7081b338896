//! Embedding providers: turn a string into a fixed-length vector.
//!
//! The matching engine only sees `Arc<dyn EmbeddingProvider>`; the backend is
//! picked once at startup by `create_provider`.
//!
//! Backends:
//! - `HashEmbedder`: feature hashing, local, deterministic, no model files.
//! - `RemoteEmbedder`: a sentence-transformer inference server over HTTP.
//!
//! Any backend can be wrapped in `Serialized` when its inference is not safe
//! to run concurrently.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::{Config, EmbeddingBackend};

pub mod hash;
pub mod remote;

pub use hash::HashEmbedder;
pub use remote::RemoteEmbedder;

/// Embedding dimension of the reference sentence model (all-MiniLM-L6-v2).
pub const DEFAULT_DIMENSION: usize = 384;

/// A fixed-length embedding vector. Only similarity is meaningful; there is no equality.
#[derive(Debug, Clone)]
pub struct Embedding {
    vector: Vec<f32>,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }

    /// The "no skills" sentinel.
    pub fn zeros(dimension: usize) -> Self {
        Self {
            vector: vec![0.0; dimension],
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.vector
    }

    #[cfg(test)]
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    #[cfg(test)]
    pub fn is_zero(&self) -> bool {
        self.vector.iter().all(|v| *v == 0.0)
    }
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Embedding has dimension {actual}, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding provider returned no vectors")]
    EmptyResponse,
}

/// Contract for anything that can embed text.
///
/// Implementations must be deterministic within a process and must return
/// the zero vector for empty or whitespace-only input.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Backend label ("hash", "remote"), surfaced on /health.
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;
}

/// Serializes calls into a provider whose inference must not overlap.
///
/// The lock is held for exactly one `embed` call, never across a whole analysis.
pub struct Serialized<P> {
    inner: P,
    gate: Mutex<()>,
}

impl<P: EmbeddingProvider> Serialized<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
        }
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for Serialized<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let _guard = self.gate.lock().await;
        self.inner.embed(text).await
    }
}

/// Builds the configured provider.
pub fn create_provider(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match &config.embedding_backend {
        EmbeddingBackend::Hash => {
            let hash = HashEmbedder::new(config.embedding_dimension);
            if config.embedding_serialize {
                Arc::new(Serialized::new(hash))
            } else {
                Arc::new(hash)
            }
        }
        EmbeddingBackend::Remote { url, api_key } => {
            let remote =
                RemoteEmbedder::new(url.clone(), api_key.clone(), config.embedding_dimension)?;
            if config.embedding_serialize {
                Arc::new(Serialized::new(remote))
            } else {
                Arc::new(remote)
            }
        }
    };

    info!(
        "Embedding provider initialized (backend: {}, dimension: {}, serialized: {})",
        provider.name(),
        provider.dimension(),
        config.embedding_serialize
    );
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records how many calls are in flight at once.
    struct SlowProvider {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn dimension(&self) -> usize {
            2
        }

        async fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Embedding::new(vec![1.0, 0.0]))
        }
    }

    fn slow() -> SlowProvider {
        SlowProvider {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    async fn run_concurrently(provider: Arc<dyn EmbeddingProvider>) {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.embed(&format!("skill {i}")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_serialized_never_overlaps_calls() {
        let provider = Arc::new(Serialized::new(slow()));
        run_concurrently(provider.clone()).await;
        assert_eq!(provider.inner.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unwrapped_provider_may_overlap() {
        let provider = Arc::new(slow());
        run_concurrently(provider.clone()).await;
        assert!(provider.peak.load(Ordering::SeqCst) > 1);
    }

    #[test]
    fn test_zero_embedding_is_zero() {
        let zero = Embedding::zeros(DEFAULT_DIMENSION);
        assert_eq!(zero.dimension(), 384);
        assert!(zero.is_zero());
        assert!(!Embedding::new(vec![0.0, 0.5]).is_zero());
    }

    #[test]
    fn test_create_provider_hash_backend() {
        let config = Config::for_tests();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "hash");
        assert_eq!(provider.dimension(), DEFAULT_DIMENSION);
    }
}
