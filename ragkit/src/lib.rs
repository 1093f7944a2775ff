//! # ragkit
//!
//! A retrieval pipeline for grounded question answering: split documents
//! into fragments, embed them, index the vectors, and serve top-k retrieval
//! under a stable contract a generation step can consume.
//!
//! ## Overview
//!
//! The crate is built from small composable pieces:
//!
//! - [`Fragmenter`] — splits [`RawSegment`]s into bounded, overlapping
//!   [`Fragment`]s ([`WindowFragmenter`], [`SegmentFragmenter`])
//! - [`Embedder`] — wraps an external embedding capability; decorate with
//!   [`RetryingEmbedder`] for exponential-backoff retries
//! - [`VectorIndex`] — k-nearest-neighbor lookup over fragment embeddings
//!   ([`BruteForceIndex`], exact and in-memory)
//! - [`Retriever`] — query-time policy: default k, metadata post-filtering
//! - [`RagPipeline`] — ingest / query / answer orchestration
//! - [`IndexSnapshot`] — JSON persistence with compatibility checks
//!
//! The embedding and generation models are capability traits, not concrete
//! bindings: any provider can be substituted without touching the pipeline.
//! Enable the `openai` feature for `reqwest`-based providers speaking the
//! OpenAI API shape.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragkit::{RagConfig, RagPipeline, RawSegment, WindowFragmenter};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::builder().chunk_size(512).chunk_overlap(100).top_k(3).build()?)
//!     .embedder(Arc::new(my_embedder))
//!     .fragmenter(Arc::new(WindowFragmenter::new(512, 100)?))
//!     .generator(Arc::new(my_generator))
//!     .build()?;
//!
//! let segments = vec![RawSegment::new("...page text...").with_metadata("page", "1")];
//! let (index, report) = pipeline.ingest(&segments).await?;
//! println!("indexed {} of {} fragments", report.indexed, report.requested);
//!
//! let answer = pipeline.answer(&index, "What changed in v2?").await?;
//! ```
//!
//! ## Design notes
//!
//! [`BruteForceIndex`] scans every entry per query — the deliberate
//! simplicity trade-off for document-scale corpora. Swap in an approximate
//! structure behind [`VectorIndex`] if scale demands it. Ingestion commits
//! per embedded batch, so a mid-ingestion failure reports
//! `completed`/`requested` counts and leaves the already-committed batches
//! queryable.

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod fragmenter;
pub mod generation;
pub mod index;
pub mod metric;
#[cfg(feature = "openai")]
pub mod openai;
pub mod persist;
pub mod pipeline;
pub mod retriever;
pub mod source;

pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    Fragment, RawSegment, RetrievalResult, SEGMENT_OFFSET_KEY, ScoredFragment,
};
pub use embedding::{Embedder, RetryPolicy, RetryingEmbedder};
pub use error::{RagError, Result};
pub use fragmenter::{Fragmenter, SegmentFragmenter, WindowFragmenter, normalize_text};
pub use generation::{GenerationRequest, Generator};
pub use index::{BruteForceIndex, VectorIndex};
pub use metric::DistanceMetric;
pub use persist::{IndexSnapshot, PersistedEntry};
pub use pipeline::{
    DEFAULT_INSTRUCTION, IndexHandle, IngestReport, RagPipeline, RagPipelineBuilder,
    assemble_context,
};
pub use retriever::{MetadataFilter, Retriever};
pub use source::{DocumentSource, InMemorySource};
