//! Error types for the `ragkit` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error (bad chunk parameters, zero k, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A document source failed to produce segments. Not retryable.
    #[error("Document unreadable ({source_label}): {message}")]
    DocumentUnreadable {
        /// The label of the document source that failed.
        source_label: String,
        /// A description of the parse failure.
        message: String,
    },

    /// The upstream embedding capability failed.
    #[error("Embedding unavailable ({provider}): {message}")]
    EmbeddingUnavailable {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
        /// Whether the failure is transient and worth retrying.
        retryable: bool,
    },

    /// The upstream generation capability failed.
    #[error("Generation unavailable ({provider}): {message}")]
    GenerationUnavailable {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector's length does not match the index dimension. Fatal; never
    /// silently coerced.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the index was constructed with.
        expected: usize,
        /// The length of the offending vector.
        actual: usize,
    },

    /// A query was issued against an index with no entries. A normal,
    /// reportable condition rather than a crash.
    #[error("Query against an empty index")]
    EmptyIndex,

    /// A persisted snapshot does not match the configuration of the index it
    /// was loaded into.
    #[error("Incompatible index: {0}")]
    IncompatibleIndex(String),

    /// Ingestion stopped partway through. Batches committed before the
    /// failure remain in the index; `completed` counts their fragments.
    #[error("Ingestion interrupted after {completed} of {requested} fragments: {source}")]
    IngestionInterrupted {
        /// Fragments committed to the index before the failure.
        completed: usize,
        /// Fragments the ingestion call was asked to index.
        requested: usize,
        /// The underlying failure.
        #[source]
        source: Box<RagError>,
    },

    /// A snapshot could not be serialized or deserialized.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
