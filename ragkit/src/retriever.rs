//! Query-time retrieval: embed the query, rank against the index, filter.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::document::RetrievalResult;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// A post-ranking predicate over fragment metadata.
///
/// Filters are applied after ranking, so filtered retrieval may return
/// fewer than k results.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataFilter {
    /// Matches fragments whose metadata has `key` exactly equal to `value`.
    Equals {
        /// The metadata key to look up.
        key: String,
        /// The exact value to match.
        value: String,
    },
    /// Matches fragments whose metadata value under `key` parses as an f64
    /// in `[min, max]`. Values that do not parse never match.
    NumericRange {
        /// The metadata key to look up.
        key: String,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
}

impl MetadataFilter {
    /// Whether the given metadata satisfies this filter.
    pub fn matches(&self, metadata: &HashMap<String, String>) -> bool {
        match self {
            MetadataFilter::Equals { key, value } => {
                metadata.get(key).is_some_and(|v| v == value)
            }
            MetadataFilter::NumericRange { key, min, max } => metadata
                .get(key)
                .and_then(|v| v.parse::<f64>().ok())
                .is_some_and(|n| n >= *min && n <= *max),
        }
    }
}

/// Wraps a [`VectorIndex`] with query-time policy.
///
/// Pure composition: embed the query text, run the k-NN query, optionally
/// post-filter. Failures from either side — `EmbeddingUnavailable`,
/// `DimensionMismatch`, `EmptyIndex` — surface unchanged.
///
/// The retriever holds only an `Arc` reference to the index it queries; the
/// index owns all fragment payloads.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    default_k: usize,
}

impl Retriever {
    /// Create a retriever with a configured default k.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `default_k` is zero.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        default_k: usize,
    ) -> Result<Self> {
        if default_k == 0 {
            return Err(RagError::InvalidConfiguration(
                "default_k must be greater than zero".to_string(),
            ));
        }
        Ok(Self { embedder, index, default_k })
    }

    /// Retrieve the `default_k` fragments most similar to the query text.
    pub async fn retrieve(&self, query_text: &str) -> Result<RetrievalResult> {
        self.retrieve_k(query_text, self.default_k).await
    }

    /// Retrieve with an explicit k, overriding the configured default.
    pub async fn retrieve_k(&self, query_text: &str, k: usize) -> Result<RetrievalResult> {
        let embedding = self.embedder.embed(query_text).await?;
        let ranked = self.index.query(&embedding, k).await?;
        debug!(k, results = ranked.len(), "retrieved fragments");
        Ok(ranked)
    }

    /// Retrieve with an explicit k, then keep only fragments matching every
    /// filter.
    ///
    /// Filtering happens after ranking, so the result may hold fewer than k
    /// fragments even when the index has more matches further down.
    pub async fn retrieve_filtered(
        &self,
        query_text: &str,
        k: usize,
        filters: &[MetadataFilter],
    ) -> Result<RetrievalResult> {
        let ranked = self.retrieve_k(query_text, k).await?;
        Ok(ranked
            .into_iter()
            .filter(|scored| filters.iter().all(|f| f.matches(&scored.fragment.metadata)))
            .collect())
    }
}
