//! Index snapshots: JSON persistence with compatibility checks.
//!
//! A snapshot serializes `{ dimension, metric, entries }` and can only be
//! loaded back into an index configured with the same dimension and metric;
//! anything else fails with
//! [`RagError::IncompatibleIndex`](crate::RagError::IncompatibleIndex).

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::Fragment;
use crate::error::{RagError, Result};
use crate::index::{BruteForceIndex, VectorIndex};
use crate::metric::DistanceMetric;

/// One persisted index entry: the vector plus its fragment payload.
///
/// The payload's own `embedding` field is left empty on capture; the vector
/// is stored once, in `embedding`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedEntry {
    /// The fragment id.
    pub id: String,
    /// The fragment's embedding vector.
    pub embedding: Vec<f32>,
    /// The fragment payload, with an empty embedding.
    pub payload: Fragment,
}

/// A serializable point-in-time copy of a [`BruteForceIndex`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexSnapshot {
    /// The embedding dimension of the captured index.
    pub dimension: usize,
    /// The distance metric of the captured index.
    pub metric: DistanceMetric,
    /// All entries in insertion order.
    pub entries: Vec<PersistedEntry>,
}

impl IndexSnapshot {
    /// Capture the current contents of an index.
    pub async fn capture(index: &BruteForceIndex) -> Self {
        let entries = index
            .fragments()
            .await
            .into_iter()
            .map(|mut fragment| {
                let embedding = std::mem::take(&mut fragment.embedding);
                PersistedEntry { id: fragment.id.clone(), embedding, payload: fragment }
            })
            .collect();
        Self { dimension: index.dimension(), metric: index.metric(), entries }
    }

    /// Serialize the snapshot as JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Persistence`] on serialization or I/O failure.
    pub fn write_to(&self, writer: impl Write) -> Result<()> {
        serde_json::to_writer(writer, self)
            .map_err(|e| RagError::Persistence(format!("failed to write snapshot: {e}")))
    }

    /// Deserialize a snapshot from a JSON reader.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Persistence`] on malformed input.
    pub fn read_from(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| RagError::Persistence(format!("failed to read snapshot: {e}")))
    }

    /// Insert every captured entry into an existing, compatibly-configured
    /// index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IncompatibleIndex`] if the target's dimension or
    /// metric differs from the snapshot's.
    pub async fn load_into(&self, index: &BruteForceIndex) -> Result<()> {
        if index.dimension() != self.dimension || index.metric() != self.metric {
            return Err(RagError::IncompatibleIndex(format!(
                "snapshot is {}-dimensional {}, target index is {}-dimensional {}",
                self.dimension,
                self.metric,
                index.dimension(),
                index.metric()
            )));
        }

        let fragments: Vec<Fragment> = self
            .entries
            .iter()
            .map(|entry| Fragment {
                id: entry.id.clone(),
                text: entry.payload.text.clone(),
                metadata: entry.payload.metadata.clone(),
                embedding: entry.embedding.clone(),
            })
            .collect();
        index.insert(&fragments).await?;
        info!(entries = fragments.len(), "restored index snapshot");
        Ok(())
    }

    /// Rebuild a fresh index holding exactly this snapshot's entries.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if the snapshot records a
    /// zero dimension (corrupt input).
    pub async fn into_index(self) -> Result<BruteForceIndex> {
        let index = BruteForceIndex::new(self.dimension, self.metric)?;
        self.load_into(&index).await?;
        Ok(index)
    }
}
