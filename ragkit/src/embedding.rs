//! Embedding adapter boundary and retry decoration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{RagError, Result};

/// An adapter that turns text into fixed-dimension embedding vectors.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. All vectors from one adapter instance share the same
/// dimension. The default [`embed_batch`](Embedder::embed_batch) calls
/// [`embed`](Embedder::embed) sequentially; backends with native batching
/// should override it.
///
/// Failures surface as [`RagError::EmbeddingUnavailable`], whose `retryable`
/// flag classifies the failure for callers (and for [`RetryingEmbedder`]).
/// Re-embedding identical text must be usable interchangeably with the
/// original vector; dimension drift is never tolerated.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Output length equals input length and ordering is preserved. A failed
    /// batch call yields nothing usable — callers must not commit partial
    /// batches.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

/// Configures retry behaviour for transient embedding failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub backoff_base_ms: u64,
    /// Maximum delay in milliseconds (cap for exponential backoff).
    pub backoff_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, backoff_base_ms: 500, backoff_max_ms: 30_000 }
    }
}

/// Computes the backoff delay for a given attempt, capped at `backoff_max_ms`.
fn compute_backoff(policy: &RetryPolicy, attempt: u32) -> u64 {
    let delay = policy.backoff_base_ms.saturating_mul(2u64.saturating_pow(attempt));
    delay.min(policy.backoff_max_ms)
}

/// Whether an error is transient and worth retrying.
fn is_retryable(err: &RagError) -> bool {
    matches!(err, RagError::EmbeddingUnavailable { retryable: true, .. })
}

/// An [`Embedder`] decorator that retries transient failures with
/// exponential backoff.
///
/// Only errors whose `retryable` flag is set are retried; everything else
/// propagates immediately. Whole batches are retried as a unit, which is
/// safe because embedding identical text is idempotent.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{RetryPolicy, RetryingEmbedder};
///
/// let embedder = RetryingEmbedder::new(Arc::new(backend), RetryPolicy::default());
/// let vector = embedder.embed("hello world").await?;
/// ```
pub struct RetryingEmbedder {
    inner: Arc<dyn Embedder>,
    policy: RetryPolicy,
}

impl RetryingEmbedder {
    /// Wrap an embedder with the given retry policy.
    pub fn new(inner: Arc<dyn Embedder>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn with_retries<T, F, Fut>(&self, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.policy.max_retries && is_retryable(&e) => {
                    let delay_ms = compute_backoff(&self.policy, attempt);
                    warn!(attempt, delay_ms, error = %e, "retrying embedding call");
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Embedder for RetryingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.with_retries(|| self.inner.embed(text)).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.with_retries(|| self.inner.embed_batch(texts)).await
    }
}
