//! Vector index: nearest-neighbor lookup over fragment embeddings.
//!
//! This module provides the [`VectorIndex`] trait and [`BruteForceIndex`],
//! an exact in-memory implementation. Brute force is the deliberate
//! simplicity/performance trade-off of this design: O(N·D) per query and
//! O(1) amortized per insert, which is fine for document-scale corpora. An
//! approximate-nearest-neighbor structure is a drop-in replacement behind
//! the same trait if corpus scale grows beyond brute-force economics.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Fragment, RetrievalResult, ScoredFragment};
use crate::error::{RagError, Result};
use crate::metric::DistanceMetric;

/// An append-only store supporting k-nearest-neighbor lookup.
///
/// All vectors in one index share the dimension fixed at construction time.
/// Inserts are atomic with respect to visibility: a reader never observes a
/// partially-inserted batch. Queries against a stable index may run
/// concurrently.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Append fragments, whose embeddings must all have the index dimension.
    ///
    /// Any fragment with an empty id is assigned one, unique for the
    /// lifetime of the index. Returns the ids of the inserted fragments in
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if any embedding's length
    /// differs from the index dimension; in that case nothing is committed.
    async fn insert(&self, fragments: &[Fragment]) -> Result<Vec<String>>;

    /// Return the `k` entries closest to `embedding` under the index metric,
    /// ascending by distance, ties broken by insertion order (earlier wins),
    /// truncated to the index size.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `k` is zero,
    /// [`RagError::DimensionMismatch`] if the query vector has the wrong
    /// length, and [`RagError::EmptyIndex`] if the index has no entries.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<RetrievalResult>;

    /// Number of entries in the index.
    async fn len(&self) -> usize;

    /// Whether the index has no entries.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// The embedding dimension this index was constructed with.
    fn dimension(&self) -> usize;

    /// The distance metric this index ranks by.
    fn metric(&self) -> DistanceMetric;
}

struct Inner {
    entries: Vec<Fragment>,
    next_id: u64,
}

/// An exact in-memory [`VectorIndex`] that scans every entry per query.
///
/// Entries live in insertion order behind a `tokio::sync::RwLock`: inserts
/// serialize on the write lock, queries share the read lock.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{BruteForceIndex, DistanceMetric, VectorIndex};
///
/// let index = BruteForceIndex::new(384, DistanceMetric::Cosine)?;
/// index.insert(&fragments).await?;
/// let ranked = index.query(&query_embedding, 5).await?;
/// ```
pub struct BruteForceIndex {
    dimension: usize,
    metric: DistanceMetric,
    inner: RwLock<Inner>,
}

impl BruteForceIndex {
    /// Create an empty index for vectors of the given dimension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `dimension` is zero.
    pub fn new(dimension: usize, metric: DistanceMetric) -> Result<Self> {
        if dimension == 0 {
            return Err(RagError::InvalidConfiguration(
                "index dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            metric,
            inner: RwLock::new(Inner { entries: Vec::new(), next_id: 0 }),
        })
    }

    /// Clone out all stored fragments in insertion order.
    ///
    /// Used by snapshotting; not part of the query path.
    pub async fn fragments(&self) -> Vec<Fragment> {
        self.inner.read().await.entries.clone()
    }
}

#[async_trait]
impl VectorIndex for BruteForceIndex {
    async fn insert(&self, fragments: &[Fragment]) -> Result<Vec<String>> {
        // Validate the whole batch before committing anything.
        for fragment in fragments {
            if fragment.embedding.len() != self.dimension {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimension,
                    actual: fragment.embedding.len(),
                });
            }
        }

        let mut inner = self.inner.write().await;
        let mut ids = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let mut fragment = fragment.clone();
            if fragment.id.is_empty() {
                fragment.id = format!("frag-{}", inner.next_id);
                inner.next_id += 1;
            }
            ids.push(fragment.id.clone());
            inner.entries.push(fragment);
        }
        debug!(inserted = ids.len(), total = inner.entries.len(), "inserted fragments");
        Ok(ids)
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(RagError::InvalidConfiguration(
                "k must be greater than zero".to_string(),
            ));
        }
        if embedding.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let inner = self.inner.read().await;
        if inner.entries.is_empty() {
            return Err(RagError::EmptyIndex);
        }

        let mut scored: Vec<(f32, usize)> = inner
            .entries
            .iter()
            .enumerate()
            .map(|(position, fragment)| {
                (self.metric.distance(embedding, &fragment.embedding), position)
            })
            .collect();

        // Ascending by distance; insertion position breaks ties.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(distance, position)| ScoredFragment {
                fragment: inner.entries[position].clone(),
                distance,
            })
            .collect())
    }

    async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn metric(&self) -> DistanceMetric {
        self.metric
    }
}
