//! Document-source boundary: parsed segments in, typed failures out.
//!
//! File parsing for each document type is an external collaborator; this
//! module only fixes the contract it must meet. [`InMemorySource`] covers
//! callers that parse upstream, plus tests and demos.

use crate::document::RawSegment;
use crate::error::Result;

/// A producer of ordered [`RawSegment`]s from some document.
///
/// Parse failures surface as
/// [`RagError::DocumentUnreadable`](crate::RagError::DocumentUnreadable),
/// which is not retryable.
pub trait DocumentSource: Send + Sync {
    /// A short label identifying the document, used in logs and errors.
    fn label(&self) -> &str;

    /// Produce the document's segments in order.
    fn segments(&self) -> Result<Vec<RawSegment>>;
}

/// A [`DocumentSource`] over segments already held in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    label: String,
    segments: Vec<RawSegment>,
}

impl InMemorySource {
    /// Wrap pre-parsed segments under the given label.
    pub fn new(label: impl Into<String>, segments: Vec<RawSegment>) -> Self {
        Self { label: label.into(), segments }
    }
}

impl DocumentSource for InMemorySource {
    fn label(&self) -> &str {
        &self.label
    }

    fn segments(&self) -> Result<Vec<RawSegment>> {
        Ok(self.segments.clone())
    }
}
