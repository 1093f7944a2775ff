//! Data types for raw segments, fragments, and retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key under which the fragmenter records a fragment's character
/// offset within its source segment.
pub const SEGMENT_OFFSET_KEY: &str = "segment_offset";

/// One unit of parsed source text (a CSV row, a PDF page, a paragraph).
///
/// Produced by a [`DocumentSource`](crate::source::DocumentSource) and
/// consumed immediately by fragmentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawSegment {
    /// The raw text of the segment.
    pub text: String,
    /// Key-value metadata describing where the segment came from.
    pub source_metadata: HashMap<String, String>,
}

impl RawSegment {
    /// Create a segment with no metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), source_metadata: HashMap::new() }
    }

    /// Attach one metadata entry, builder-style.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.source_metadata.insert(key.into(), value.into());
        self
    }
}

/// A bounded-size piece of a [`RawSegment`], the unit of retrieval.
///
/// The embedding is empty until the pipeline attaches one; fragments are
/// never mutated after insertion into an index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fragment {
    /// Unique identifier. The index assigns one if this is empty on insert.
    pub id: String,
    /// The fragment text, normalized by the fragmenter.
    pub text: String,
    /// Metadata inherited from the source segment plus fragment-specific
    /// fields such as [`SEGMENT_OFFSET_KEY`].
    pub metadata: HashMap<String, String>,
    /// The vector embedding for this fragment's text. Empty until embedded.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Fragment`] paired with its distance from the query vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredFragment {
    /// The retrieved fragment.
    pub fragment: Fragment,
    /// Distance under the index metric. Lower is more similar.
    pub distance: f32,
}

/// Ranked retrieval output: ascending by distance, at most k entries.
pub type RetrievalResult = Vec<ScoredFragment>;
